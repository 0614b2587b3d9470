use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::services::auth::error::AuthError;

pub const DEFAULT_USERNAME_CLAIM: &str = "username";
pub const DEFAULT_ROLES_CLAIM: &str = "roles";

/// Bearer token exactly as received.
///
/// Debug output never includes the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct RawToken(String);

impl RawToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawToken(..)")
    }
}

/// Which claims carry the username and roles, and the role used when none is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSettings {
    pub username_claim: String,
    pub roles_claim: String,
    pub default_role: Option<String>,
}

impl Default for ClaimSettings {
    fn default() -> Self {
        Self {
            username_claim: DEFAULT_USERNAME_CLAIM.to_string(),
            roles_claim: DEFAULT_ROLES_CLAIM.to_string(),
            default_role: None,
        }
    }
}

impl ClaimSettings {
    /// Overrides fall back to the defaults when `None` or empty.
    pub fn new(
        username_claim: Option<&str>,
        roles_claim: Option<&str>,
        default_role: Option<&str>,
    ) -> Self {
        let pick = |v: Option<&str>, fallback: &str| {
            v.filter(|s| !s.is_empty()).unwrap_or(fallback).to_string()
        };

        Self {
            username_claim: pick(username_claim, DEFAULT_USERNAME_CLAIM),
            roles_claim: pick(roles_claim, DEFAULT_ROLES_CLAIM),
            default_role: default_role.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

/// Normalized claim set of one token.
#[derive(Debug, Clone, PartialEq)]
pub struct Claims {
    pub username: String,
    pub roles: BTreeSet<String>,
    pub payload: Map<String, Value>,
}

impl Claims {
    pub fn from_payload(payload: Map<String, Value>, settings: &ClaimSettings) -> Result<Self, AuthError> {
        let username = match payload.get(&settings.username_claim) {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(AuthError::MissingClaim(settings.username_claim.clone())),
        };

        let roles = match payload.get(&settings.roles_claim) {
            None | Some(Value::Null) => settings.default_role.iter().cloned().collect(),
            Some(value) => normalize_roles(value),
        };

        Ok(Self {
            username,
            roles,
            payload,
        })
    }
}

// "ROLE_A, ROLE_B" and ["ROLE_A", "ROLE_B"] both become {ROLE_A, ROLE_B}.
fn normalize_roles(value: &Value) -> BTreeSet<String> {
    let split = |s: &str| {
        s.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    match value {
        Value::String(s) => split(s).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split)
            .collect(),
        _ => BTreeSet::new(),
    }
}
