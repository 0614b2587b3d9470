/// Factory: build the identity pipeline, decider and resolver from `Config`.
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::repos::store::DataStore;
use crate::services::auth::extractor::TokenExtractor;
use crate::services::auth::facade::IdentityFacade;
use crate::services::auth::keys::{KeyMaterial, StaticKeyResolver};
use crate::services::auth::provider::JwtAuthProvider;
use crate::services::auth::user_provider::{DefaultDataMapper, UserResolver};
use crate::services::auth::verifier::SignatureVerifier;
use crate::services::authz::decider::AuthorizationDecider;
use crate::services::resolver::audit::{AuditSink, FileAuditSink, TracingAuditSink};
use crate::services::resolver::field_resolver::FieldResolver;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("jwt is enabled but no key is configured")]
    MissingKey,
    #[error("cannot open tripwire log: {0}")]
    AuditLog(#[from] std::io::Error),
}

pub fn build_identity_facade(config: &Config, store: Arc<dyn DataStore>) -> Result<IdentityFacade, BuildError> {
    let extractor = TokenExtractor::new(config.jwt_header.clone());

    if !config.jwt_enabled {
        tracing::warn!("jwt disabled; every request runs as the anonymous user");
        return Ok(IdentityFacade::new(extractor, None));
    }

    let key = config.jwt_key.clone().ok_or(BuildError::MissingKey)?;
    let provider = JwtAuthProvider::new(
        Arc::new(StaticKeyResolver::new(KeyMaterial::new(key))),
        SignatureVerifier::new(config.jwt_algo),
        UserResolver::new(store, Arc::new(DefaultDataMapper::new(config.user_table.clone()))),
    );

    Ok(IdentityFacade::new(extractor, Some(provider)))
}

pub fn build_decider(config: &Config) -> AuthorizationDecider {
    AuthorizationDecider::standard(
        config.decision_strategy,
        config.role_hierarchy.clone(),
        config.anonymous_username_access,
    )
}

pub fn build_audit_sink(config: &Config) -> Result<Arc<dyn AuditSink>, BuildError> {
    Ok(match &config.tripwire_log {
        Some(path) => Arc::new(FileAuditSink::open(path)?),
        None => Arc::new(TracingAuditSink),
    })
}

pub fn build_field_resolver(config: &Config) -> Result<FieldResolver, BuildError> {
    Ok(FieldResolver::new(build_audit_sink(config)?))
}
