/*
 * Responsibility
 * - Read settings from the environment (.env via dotenvy)
 * - Validate them up front; a bad value fails startup
 * - Parsing goes through a lookup function so tests never touch the real environment
 */
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::services::auth::claims::ClaimSettings;
use crate::services::auth::extractor::DEFAULT_TOKEN_HEADER;
use crate::services::auth::facade::{AuthSettings, DEFAULT_ADMIN_ROLE};
use crate::services::auth::user_provider::DEFAULT_USER_TABLE;
use crate::services::authz::decider::DecisionStrategy;
use crate::services::authz::hierarchy::RoleHierarchy;
use crate::services::authz::role_voter::ROLE_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None: in-memory store
    pub database_url: Option<String>,

    pub jwt_enabled: bool,
    pub jwt_algo: Algorithm,
    pub jwt_key: Option<String>,
    pub jwt_header: String,
    pub claims: ClaimSettings,

    pub admin_role: String,
    pub anonymous_admin: bool,
    pub anonymous_on_omitted_token: bool,
    pub anonymous_username_access: bool,
    pub decision_strategy: DecisionStrategy,
    pub role_hierarchy: Option<RoleHierarchy>,

    pub user_table: String,
    pub tripwire_log: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port: u16 = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());
        let database_url = get("DATABASE_URL");

        let jwt_key = get("JWT_KEY").map(|v| load_key(&v)).transpose()?;
        let jwt_enabled = flag(get("JWT_ENABLED"), "JWT_ENABLED", jwt_key.is_some())?;
        if jwt_enabled && jwt_key.is_none() {
            return Err(ConfigError::Missing("JWT_KEY"));
        }

        let jwt_algo = match get("JWT_ALGO") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("JWT_ALGO"))?,
            None => Algorithm::RS256,
        };

        let claims = ClaimSettings::new(
            get("JWT_USERNAME_CLAIM").as_deref(),
            get("JWT_ROLES_CLAIM").as_deref(),
            get("JWT_DEFAULT_ROLE").as_deref(),
        );

        let decision_strategy = match get("DECISION_STRATEGY") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("DECISION_STRATEGY"))?,
            None => DecisionStrategy::default(),
        };

        // Role voters only support ROLE_* attributes.
        let admin_role = get("ADMIN_ROLE").unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string());
        if !admin_role.starts_with(ROLE_PREFIX) {
            return Err(ConfigError::Invalid("ADMIN_ROLE"));
        }

        let role_hierarchy = get("ROLE_HIERARCHY")
            .map(|v| v.parse::<RoleHierarchy>())
            .transpose()
            .map_err(|_| ConfigError::Invalid("ROLE_HIERARCHY"))?;

        Ok(Self {
            addr,
            app_env,
            database_url,
            jwt_enabled,
            jwt_algo,
            jwt_key,
            jwt_header: get("JWT_HEADER").unwrap_or_else(|| DEFAULT_TOKEN_HEADER.to_string()),
            claims,
            admin_role,
            anonymous_admin: flag(get("ANONYMOUS_ADMIN"), "ANONYMOUS_ADMIN", false)?,
            anonymous_on_omitted_token: flag(
                get("ANONYMOUS_ON_OMITTED_TOKEN"),
                "ANONYMOUS_ON_OMITTED_TOKEN",
                false,
            )?,
            anonymous_username_access: flag(
                get("ANONYMOUS_USERNAME_ACCESS"),
                "ANONYMOUS_USERNAME_ACCESS",
                true,
            )?,
            decision_strategy,
            role_hierarchy,
            user_table: get("USER_TABLE").unwrap_or_else(|| DEFAULT_USER_TABLE.to_string()),
            tripwire_log: get("TRIPWIRE_LOG").map(PathBuf::from),
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            claims: self.claims.clone(),
            admin_role: self.admin_role.clone(),
            anonymous_admin: self.anonymous_admin,
            anonymous_on_omitted_token: self.anonymous_on_omitted_token,
        }
    }
}

fn flag(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key)),
    }
}

// Inline key, or a path to one. Read once here and never again.
fn load_key(value: &str) -> Result<String, ConfigError> {
    let looks_like_path = !value.starts_with("-----") && (value.starts_with('/') || Path::new(value).is_file());

    let key = if looks_like_path {
        std::fs::read_to_string(value).map_err(|err| {
            tracing::error!(error = ?err, path = %value, "failed to read JWT_KEY file");
            ConfigError::Invalid("JWT_KEY")
        })?
    } else {
        value.to_string()
    };

    Ok(key.replace("\\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert!(!config.jwt_enabled);
        assert_eq!(config.jwt_algo, Algorithm::RS256);
        assert_eq!(config.jwt_header, "X-Authorization");
        assert_eq!(config.claims, ClaimSettings::default());
        assert_eq!(config.admin_role, "ROLE_ADMIN");
        assert!(!config.anonymous_admin);
        assert!(!config.anonymous_on_omitted_token);
        assert!(config.anonymous_username_access);
        assert_eq!(config.decision_strategy, DecisionStrategy::Affirmative);
        assert!(config.role_hierarchy.is_none());
        assert_eq!(config.user_table, "user_data");
    }

    #[test]
    fn test_key_enables_jwt_and_is_unescaped() {
        let config = config(&[("JWT_KEY", "-----BEGIN KEY-----\\nabc\\n-----END KEY-----")]).unwrap();

        assert!(config.jwt_enabled);
        assert_eq!(
            config.jwt_key.as_deref(),
            Some("-----BEGIN KEY-----\nabc\n-----END KEY-----")
        );
    }

    #[test]
    fn test_key_is_read_from_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rs256_public.pem");
        let config = config(&[("JWT_KEY", path)]).unwrap();

        assert!(config.jwt_key.unwrap().starts_with("-----BEGIN RSA PUBLIC KEY-----"));
    }

    #[test]
    fn test_unreadable_key_path() {
        let err = config(&[("JWT_KEY", "/nonexistent/graphgate/key.pem")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid("JWT_KEY"));
    }

    #[test]
    fn test_enabled_without_key() {
        let err = config(&[("JWT_ENABLED", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_KEY"));
    }

    #[test]
    fn test_explicitly_disabled_with_key() {
        let config = config(&[("JWT_ENABLED", "false"), ("JWT_KEY", "secret")]).unwrap();
        assert!(!config.jwt_enabled);
    }

    #[test]
    fn test_admin_role_must_be_a_role() {
        assert_eq!(
            config(&[("ADMIN_ROLE", "admin")]).unwrap_err(),
            ConfigError::Invalid("ADMIN_ROLE")
        );
        assert_eq!(config(&[("ADMIN_ROLE", "ROLE_SUPER")]).unwrap().admin_role, "ROLE_SUPER");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("JWT_KEY", "secret"),
            ("JWT_ALGO", "HS256"),
            ("JWT_USERNAME_CLAIM", "sub"),
            ("JWT_DEFAULT_ROLE", "ROLE_USER"),
            ("ADMIN_ROLE", "ROLE_ROOT"),
            ("ANONYMOUS_ON_OMITTED_TOKEN", "yes"),
            ("DECISION_STRATEGY", "unanimous"),
            ("ROLE_HIERARCHY", "ROLE_ROOT:ROLE_USER"),
            ("TRIPWIRE_LOG", "/var/log/tripwire.log"),
        ])
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert!(config.app_env.is_production());
        assert_eq!(config.jwt_algo, Algorithm::HS256);
        assert_eq!(config.claims.username_claim, "sub");
        assert_eq!(config.claims.default_role.as_deref(), Some("ROLE_USER"));
        assert_eq!(config.auth_settings().admin_role, "ROLE_ROOT");
        assert!(config.anonymous_on_omitted_token);
        assert_eq!(config.decision_strategy, DecisionStrategy::Unanimous);
        assert!(config.role_hierarchy.is_some());
        assert_eq!(config.tripwire_log, Some(PathBuf::from("/var/log/tripwire.log")));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(config(&[("PORT", "http")]).unwrap_err(), ConfigError::Invalid("PORT"));
        assert_eq!(
            config(&[("JWT_KEY", "k"), ("JWT_ALGO", "RS999")]).unwrap_err(),
            ConfigError::Invalid("JWT_ALGO")
        );
        assert_eq!(
            config(&[("DECISION_STRATEGY", "consensus")]).unwrap_err(),
            ConfigError::Invalid("DECISION_STRATEGY")
        );
        assert_eq!(
            config(&[("ANONYMOUS_ADMIN", "maybe")]).unwrap_err(),
            ConfigError::Invalid("ANONYMOUS_ADMIN")
        );
        assert_eq!(
            config(&[("ROLE_HIERARCHY", "ROLE_A")]).unwrap_err(),
            ConfigError::Invalid("ROLE_HIERARCHY")
        );
    }
}
