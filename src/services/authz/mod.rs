pub mod context;
pub mod decider;
pub mod hierarchy;
pub mod role_voter;
pub mod username_voter;
pub mod voter;

pub use context::{AccessDenied, AuthorizationContext, RequestRef};
pub use decider::{AuthorizationDecider, DecisionStrategy};
pub use hierarchy::{RoleHierarchy, RoleHierarchyVoter};
pub use role_voter::RoleVoter;
pub use username_voter::{USERNAME_ACCESS_ROLE, UsernameVoter};
pub use voter::{Subject, UsernameAuthorization, Vote, Voter};
