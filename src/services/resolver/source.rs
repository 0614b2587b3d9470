//! What a field is resolved against: the parent value.
//!
//! Parents are either plain rows (JSON objects) or objects that expose
//! properties, some of which may be computed lazily.
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::services::authz::context::AuthorizationContext;
use crate::services::resolver::error::ResolveError;

/// Field arguments as supplied by the execution engine.
pub type Args = Map<String, Value>;

pub type DeferredFn =
    Arc<dyn Fn(&Source, &Args, &AuthorizationContext) -> Result<Value, ResolveError> + Send + Sync>;

/// A property value, either ready or computed on access.
#[derive(Clone)]
pub enum FieldValue {
    Value(Value),
    Deferred(DeferredFn),
}

impl FieldValue {
    pub fn deferred<F>(compute: F) -> Self
    where
        F: Fn(&Source, &Args, &AuthorizationContext) -> Result<Value, ResolveError> + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(compute))
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Parent object exposing named properties.
pub trait ObjectSource: Send + Sync {
    fn property(&self, name: &str) -> Option<FieldValue>;
}

#[derive(Clone)]
pub enum Source {
    Row(Map<String, Value>),
    Object(Arc<dyn ObjectSource>),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(row) => f.debug_tuple("Row").field(row).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl From<Map<String, Value>> for Source {
    fn from(row: Map<String, Value>) -> Self {
        Self::Row(row)
    }
}

impl Source {
    /// Property lookup; row keys first, then object properties. `null` counts as unset.
    pub fn get(&self, key: &str) -> Option<FieldValue> {
        match self {
            Self::Row(row) => row
                .get(key)
                .filter(|v| !v.is_null())
                .cloned()
                .map(FieldValue::Value),
            Self::Object(object) => object
                .property(key)
                .filter(|v| !matches!(v, FieldValue::Value(Value::Null))),
        }
    }

    /// Plain value under `key`, `null` when missing or computed.
    pub fn value(&self, key: &str) -> Value {
        match self.get(key) {
            Some(FieldValue::Value(v)) => v,
            _ => Value::Null,
        }
    }
}

/// Falsy: null, false, 0, 0.0, "", "0", empty list or object.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(false), true)]
    #[case(json!(0), true)]
    #[case(json!(0.0), true)]
    #[case(json!(""), true)]
    #[case(json!("0"), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    #[case(json!(true), false)]
    #[case(json!(-1), false)]
    #[case(json!("00"), false)]
    #[case(json!(" "), false)]
    #[case(json!([0]), false)]
    fn test_is_blank(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_blank(&value), expected);
    }

    struct Profile;

    impl ObjectSource for Profile {
        fn property(&self, name: &str) -> Option<FieldValue> {
            match name {
                "name" => Some(json!("Alice").into()),
                "nothing" => Some(Value::Null.into()),
                "computed" => Some(FieldValue::deferred(|_, _, _| Ok(json!(1)))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_row_and_object_lookup() {
        let row = Source::from(json!({"a": 1, "b": null}).as_object().cloned().unwrap());
        assert_eq!(row.value("a"), json!(1));
        assert!(row.get("b").is_none());
        assert!(row.get("c").is_none());

        let object = Source::Object(Arc::new(Profile));
        assert_eq!(object.value("name"), json!("Alice"));
        assert!(object.get("nothing").is_none());
        assert!(matches!(object.get("computed"), Some(FieldValue::Deferred(_))));
        assert_eq!(object.value("computed"), Value::Null);
    }
}
