pub mod audit;
pub mod convert;
pub mod error;
pub mod field_config;
pub mod field_resolver;
pub mod operations;
pub mod sanitize;
pub mod source;

pub use audit::{AuditSink, FileAuditSink, NoopAuditSink, TracingAuditSink};
pub use convert::Conversion;
pub use error::ResolveError;
pub use field_config::{ColumnLookup, FieldConfig, FieldDescriptor, SchemaField};
pub use field_resolver::FieldResolver;
pub use operations::{LinkOperation, ListOperation, RowSource, TableLink, TableList, TableSource};
pub use source::{Args, FieldValue, ObjectSource, Source};
