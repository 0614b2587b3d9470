use crate::services::auth::identity::Identity;
use crate::services::authz::voter::{Subject, Voter};

pub const ROLE_PREFIX: &str = "ROLE_";

/// Grants when the caller holds the required role.
///
/// Only attributes starting with `ROLE_` are considered.
#[derive(Debug, Clone, Default)]
pub struct RoleVoter;

impl Voter for RoleVoter {
    fn name(&self) -> &'static str {
        "role"
    }

    fn supports(&self, attribute: &str, _subject: Option<&Subject>) -> bool {
        attribute.starts_with(ROLE_PREFIX)
    }

    fn vote_on_attribute(&self, attribute: &str, _subject: Option<&Subject>, identity: &Identity) -> bool {
        identity.has_role(attribute)
    }
}
