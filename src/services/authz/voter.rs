//! Voter capability and the subjects voters decide on.
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::services::auth::identity::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Granted,
    Denied,
    Abstain,
}

/// "Is the caller allowed to touch data owned by `accessed_username`?"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameAuthorization {
    accessed_username: String,
}

impl UsernameAuthorization {
    pub fn new(accessed_username: impl Into<String>) -> Self {
        Self {
            accessed_username: accessed_username.into(),
        }
    }

    pub fn accessed_username(&self) -> &str {
        &self.accessed_username
    }
}

#[derive(Clone)]
pub enum Subject {
    Username(UsernameAuthorization),
    // Anything an application-specific voter knows how to downcast.
    Custom(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(u) => f.debug_tuple("Username").field(u).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub trait Voter: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, attribute: &str, subject: Option<&Subject>) -> bool;

    /// Only called for supported attributes.
    fn vote_on_attribute(&self, attribute: &str, subject: Option<&Subject>, identity: &Identity) -> bool;

    fn vote(&self, attribute: &str, subject: Option<&Subject>, identity: &Identity) -> Vote {
        if !self.supports(attribute, subject) {
            return Vote::Abstain;
        }
        if self.vote_on_attribute(attribute, subject, identity) {
            Vote::Granted
        } else {
            Vote::Denied
        }
    }

    /// One vote over several attributes: granted if any supported attribute is
    /// granted, denied if some were supported and none granted.
    fn vote_all(&self, identity: &Identity, attributes: &[&str], subject: Option<&Subject>) -> Vote {
        let mut result = Vote::Abstain;
        for attribute in attributes {
            match self.vote(attribute, subject, identity) {
                Vote::Granted => return Vote::Granted,
                Vote::Denied => result = Vote::Denied,
                Vote::Abstain => {}
            }
        }
        result
    }
}
