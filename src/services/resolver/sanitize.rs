use serde_json::Value;

use crate::services::resolver::error::ResolveError;

/// HTML-escape a scalar for markup contexts. `null` becomes `""`.
pub fn sanitize(value: &Value) -> Result<Value, ResolveError> {
    let text = match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => escape_html(s),
        Value::Array(_) | Value::Object(_) => {
            return Err(ResolveError::InvalidValue(
                "only scalars can be sanitized".to_string(),
            ));
        }
    };
    Ok(Value::String(text))
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
