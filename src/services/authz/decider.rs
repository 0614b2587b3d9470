/*
 * Responsibility
 * - Combine voters into one yes/no answer
 * - Strategy is fixed at startup (affirmative or unanimous)
 */
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::services::auth::identity::Identity;
use crate::services::authz::hierarchy::{RoleHierarchy, RoleHierarchyVoter};
use crate::services::authz::role_voter::RoleVoter;
use crate::services::authz::username_voter::UsernameVoter;
use crate::services::authz::voter::{Subject, Vote, Voter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionStrategy {
    /// One grant is enough.
    #[default]
    Affirmative,
    /// No voter may deny and at least one must grant.
    Unanimous,
}

impl FromStr for DecisionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "affirmative" => Ok(Self::Affirmative),
            "unanimous" => Ok(Self::Unanimous),
            other => Err(format!("unknown decision strategy: {other}")),
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationDecider {
    voters: Vec<Arc<dyn Voter>>,
    strategy: DecisionStrategy,
}

impl fmt::Debug for AuthorizationDecider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationDecider")
            .field("voters", &self.voters.iter().map(|v| v.name()).collect::<Vec<_>>())
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl AuthorizationDecider {
    pub fn new(voters: Vec<Arc<dyn Voter>>, strategy: DecisionStrategy) -> Self {
        Self { voters, strategy }
    }

    /// Role voter (hierarchy-aware when one is given) plus the username voter.
    pub fn standard(
        strategy: DecisionStrategy,
        hierarchy: Option<RoleHierarchy>,
        anonymous_username_access: bool,
    ) -> Self {
        let role_voter: Arc<dyn Voter> = match hierarchy.filter(|h| !h.is_empty()) {
            Some(h) => Arc::new(RoleHierarchyVoter::new(h)),
            None => Arc::new(RoleVoter),
        };

        Self::new(
            vec![role_voter, Arc::new(UsernameVoter::new(anonymous_username_access))],
            strategy,
        )
    }

    pub fn strategy(&self) -> DecisionStrategy {
        self.strategy
    }

    pub fn is_granted(&self, identity: &Identity, attributes: &[&str], subject: Option<&Subject>) -> bool {
        let mut granted = 0usize;
        let mut denied = 0usize;

        for voter in &self.voters {
            match voter.vote_all(identity, attributes, subject) {
                Vote::Granted => granted += 1,
                Vote::Denied => denied += 1,
                Vote::Abstain => {}
            }
        }

        let decision = match self.strategy {
            DecisionStrategy::Affirmative => granted > 0,
            DecisionStrategy::Unanimous => denied == 0 && granted > 0,
        };

        tracing::trace!(
            username = %identity.username(),
            ?attributes,
            granted,
            denied,
            decision,
            "authorization decision"
        );

        decision
    }
}
