use crate::services::auth::identity::Identity;
use crate::services::authz::voter::{Subject, Voter};

pub const USERNAME_ACCESS_ROLE: &str = "USERNAME_ACCESS_ROLE";

/// Owner check: the caller may access data of the username it carries.
///
/// With `allow_anonymous` the anonymous, credential-less identity is granted
/// as well; that identity only exists when token checks are off.
#[derive(Debug, Clone)]
pub struct UsernameVoter {
    allow_anonymous: bool,
}

impl Default for UsernameVoter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl UsernameVoter {
    pub fn new(allow_anonymous: bool) -> Self {
        Self { allow_anonymous }
    }
}

impl Voter for UsernameVoter {
    fn name(&self) -> &'static str {
        "username"
    }

    fn supports(&self, attribute: &str, subject: Option<&Subject>) -> bool {
        attribute == USERNAME_ACCESS_ROLE && matches!(subject, Some(Subject::Username(_)))
    }

    fn vote_on_attribute(&self, _attribute: &str, subject: Option<&Subject>, identity: &Identity) -> bool {
        let Some(Subject::Username(target)) = subject else {
            return false;
        };

        if self.allow_anonymous && identity.is_anonymous() {
            return true;
        }

        identity.username() == target.accessed_username()
    }
}
