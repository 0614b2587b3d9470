use std::fmt;
use std::sync::Arc;

use crate::services::resolver::operations::{LinkOperation, ListOperation, RowSource};

/// Column lookup used by `getBy`/`getAllBy`.
#[derive(Clone)]
pub struct ColumnLookup {
    pub target: Arc<dyn RowSource>,
    pub column: String,
}

impl ColumnLookup {
    pub fn new(target: Arc<dyn RowSource>, column: impl Into<String>) -> Self {
        Self {
            target,
            column: column.into(),
        }
    }
}

/// Declarative metadata attached to one schema field.
#[derive(Clone)]
pub struct FieldConfig {
    pub alias: Option<String>,
    pub link: Option<Arc<dyn LinkOperation>>,
    pub list: Option<Arc<dyn ListOperation>>,
    pub get_all_by: Option<ColumnLookup>,
    pub get_by: Option<ColumnLookup>,
    pub convert: Option<String>,
    pub authorize: bool,
    pub sanitize: bool,
    pub tripwire: bool,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            alias: None,
            link: None,
            list: None,
            get_all_by: None,
            get_by: None,
            convert: None,
            authorize: true,
            sanitize: false,
            tripwire: false,
        }
    }
}

impl fmt::Debug for FieldConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConfig")
            .field("alias", &self.alias)
            .field("link", &self.link.is_some())
            .field("list", &self.list.is_some())
            .field("get_all_by", &self.get_all_by.as_ref().map(|l| &l.column))
            .field("get_by", &self.get_by.as_ref().map(|l| &l.column))
            .field("convert", &self.convert)
            .field("authorize", &self.authorize)
            .field("sanitize", &self.sanitize)
            .field("tripwire", &self.tripwire)
            .finish()
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(mut self, key: impl Into<String>) -> Self {
        self.alias = Some(key.into());
        self
    }

    pub fn link(mut self, operation: Arc<dyn LinkOperation>) -> Self {
        self.link = Some(operation);
        self
    }

    pub fn list(mut self, operation: Arc<dyn ListOperation>) -> Self {
        self.list = Some(operation);
        self
    }

    pub fn get_all_by(mut self, target: Arc<dyn RowSource>, column: impl Into<String>) -> Self {
        self.get_all_by = Some(ColumnLookup::new(target, column));
        self
    }

    pub fn get_by(mut self, target: Arc<dyn RowSource>, column: impl Into<String>) -> Self {
        self.get_by = Some(ColumnLookup::new(target, column));
        self
    }

    pub fn convert(mut self, conversion: impl Into<String>) -> Self {
        self.convert = Some(conversion.into());
        self
    }

    pub fn authorize(mut self, authorize: bool) -> Self {
        self.authorize = authorize;
        self
    }

    pub fn sanitize(mut self) -> Self {
        self.sanitize = true;
        self
    }

    pub fn tripwire(mut self) -> Self {
        self.tripwire = true;
        self
    }
}

/// Access to the metadata of the field being resolved.
pub trait FieldDescriptor: Send + Sync {
    /// Name of the type declaring the field.
    fn parent_type(&self) -> &str;

    fn field_name(&self) -> &str;

    fn config(&self) -> &FieldConfig;
}

#[derive(Debug, Clone)]
pub struct SchemaField {
    parent_type: String,
    field_name: String,
    config: FieldConfig,
}

impl SchemaField {
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>, config: FieldConfig) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
            config,
        }
    }
}

impl FieldDescriptor for SchemaField {
    fn parent_type(&self) -> &str {
        &self.parent_type
    }

    fn field_name(&self) -> &str {
        &self.field_name
    }

    fn config(&self) -> &FieldConfig {
        &self.config
    }
}
