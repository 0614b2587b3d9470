/*
 * Responsibility
 * - Supply verification key material for a claimed username
 * - Static (one key for everyone) and per-tenant lookups
 */
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no verification key for tenant {0:?}")]
    UnknownTenant(String),
    #[error("verification key unavailable: {0}")]
    Unavailable(String),
}

/// PEM text or shared secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial(String);

impl KeyMaterial {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

pub trait CertificateResolver: Send + Sync {
    fn verification_key(&self, username: &str) -> Result<KeyMaterial, KeyError>;
}

#[derive(Debug, Clone)]
pub struct StaticKeyResolver {
    key: KeyMaterial,
}

impl StaticKeyResolver {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }
}

impl CertificateResolver for StaticKeyResolver {
    fn verification_key(&self, _username: &str) -> Result<KeyMaterial, KeyError> {
        Ok(self.key.clone())
    }
}

/// Key per tenant. `alice@acme` belongs to tenant `acme`; usernames without
/// `@` only ever get the fallback key.
#[derive(Debug, Clone, Default)]
pub struct TenantKeyResolver {
    keys: HashMap<String, KeyMaterial>,
    fallback: Option<KeyMaterial>,
}

impl TenantKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>, key: KeyMaterial) -> Self {
        self.keys.insert(tenant.into(), key);
        self
    }

    pub fn with_fallback(mut self, key: KeyMaterial) -> Self {
        self.fallback = Some(key);
        self
    }

    fn tenant_of(username: &str) -> Option<&str> {
        username
            .rsplit_once('@')
            .map(|(_, tenant)| tenant)
            .filter(|t| !t.is_empty())
    }
}

impl CertificateResolver for TenantKeyResolver {
    fn verification_key(&self, username: &str) -> Result<KeyMaterial, KeyError> {
        let tenant = Self::tenant_of(username);

        if let Some(key) = tenant.and_then(|t| self.keys.get(t)) {
            return Ok(key.clone());
        }

        self.fallback
            .clone()
            .ok_or_else(|| KeyError::UnknownTenant(tenant.unwrap_or_default().to_string()))
    }
}
