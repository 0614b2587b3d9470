/*
 * Responsibility
 * - Produce one field's value from its declarative config
 * - Fixed priority: tripwire, alias, link, list, getAllBy, getBy, property,
 *   convert, sanitize, deferred
 * - No per-request state; safe to share and to call concurrently
 */
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::services::authz::context::AuthorizationContext;
use crate::services::resolver::audit::AuditSink;
use crate::services::resolver::convert::Conversion;
use crate::services::resolver::error::ResolveError;
use crate::services::resolver::field_config::{FieldConfig, FieldDescriptor};
use crate::services::resolver::sanitize::sanitize;
use crate::services::resolver::source::{Args, FieldValue, Source, is_blank};

#[derive(Clone)]
pub struct FieldResolver {
    audit: Arc<dyn AuditSink>,
}

impl FieldResolver {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self { audit }
    }

    pub async fn resolve(
        &self,
        source: &Source,
        args: &Args,
        ctx: &AuthorizationContext,
        field: &dyn FieldDescriptor,
    ) -> Result<Value, ResolveError> {
        let config = field.config();

        if config.tripwire {
            self.audit.tripwire(field.parent_type(), field.field_name());
            return Ok(Value::Null);
        }

        let key = config.alias.as_deref().unwrap_or(field.field_name());

        if let Some(link) = &config.link {
            let related = link.link(&source.value(key), ctx, config.authorize).await?;
            return Ok(related.filter(|v| !is_blank(v)).unwrap_or(Value::Null));
        }

        if let Some(list) = &config.list {
            let items = list.list(&source.value(key), ctx, config.authorize).await?;
            return Ok(Value::Array(items.unwrap_or_default()));
        }

        if let Some(lookup) = &config.get_all_by {
            let rows = lookup
                .target
                .find_all_by(&lookup.column, &source.value(key), ctx, config.authorize)
                .await?;
            return Ok(Value::Array(rows));
        }

        if let Some(lookup) = &config.get_by {
            let row = lookup
                .target
                .find_one_by(&lookup.column, &source.value(key), ctx, config.authorize)
                .await?;
            return Ok(row.filter(|v| !is_blank(v)).unwrap_or(Value::Null));
        }

        match source.get(key) {
            Some(FieldValue::Deferred(compute)) => compute(source, args, ctx),
            Some(FieldValue::Value(value)) => finish(value, config),
            None => finish(Value::Null, config),
        }
    }
}

fn finish(mut value: Value, config: &FieldConfig) -> Result<Value, ResolveError> {
    if let Some(name) = &config.convert {
        let conversion: Conversion = name.parse()?;
        if !is_blank(&value) {
            value = conversion.apply(&value, Utc::now())?;
        }
    }

    if config.sanitize {
        value = sanitize(&value)?;
    }

    Ok(value)
}
