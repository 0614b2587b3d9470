/*
 * Responsibility
 * - Role -> implied roles mapping, expanded transitively
 * - Parsed from "ROLE_A:ROLE_B,ROLE_C;ROLE_B:ROLE_D"
 * - RoleHierarchyVoter replaces RoleVoter when a hierarchy is configured
 */
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use thiserror::Error;

use crate::services::auth::identity::Identity;
use crate::services::authz::role_voter::ROLE_PREFIX;
use crate::services::authz::voter::{Subject, Voter};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid role hierarchy entry: {0:?}")]
pub struct RoleHierarchyError(String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleHierarchy {
    // role -> every role it reaches, itself excluded
    reachable: BTreeMap<String, BTreeSet<String>>,
}

impl RoleHierarchy {
    pub fn new(direct: BTreeMap<String, BTreeSet<String>>) -> Self {
        let mut reachable = BTreeMap::new();

        for role in direct.keys() {
            let mut seen = BTreeSet::new();
            let mut pending: Vec<&String> = direct[role].iter().collect();

            while let Some(next) = pending.pop() {
                if next == role || !seen.insert(next.clone()) {
                    continue;
                }
                if let Some(children) = direct.get(next) {
                    pending.extend(children.iter());
                }
            }

            reachable.insert(role.clone(), seen);
        }

        Self { reachable }
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    /// The given roles plus everything they imply.
    pub fn reachable_roles(&self, roles: &BTreeSet<String>) -> BTreeSet<String> {
        let mut all = roles.clone();
        for role in roles {
            if let Some(implied) = self.reachable.get(role) {
                all.extend(implied.iter().cloned());
            }
        }
        all
    }
}

impl FromStr for RoleHierarchy {
    type Err = RoleHierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut direct: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (role, implied) = entry
                .split_once(':')
                .ok_or_else(|| RoleHierarchyError(entry.to_string()))?;

            let role = role.trim();
            if role.is_empty() {
                return Err(RoleHierarchyError(entry.to_string()));
            }

            direct.entry(role.to_string()).or_default().extend(
                implied
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string),
            );
        }

        Ok(Self::new(direct))
    }
}

#[derive(Debug, Clone)]
pub struct RoleHierarchyVoter {
    hierarchy: RoleHierarchy,
}

impl RoleHierarchyVoter {
    pub fn new(hierarchy: RoleHierarchy) -> Self {
        Self { hierarchy }
    }
}

impl Voter for RoleHierarchyVoter {
    fn name(&self) -> &'static str {
        "role_hierarchy"
    }

    fn supports(&self, attribute: &str, _subject: Option<&Subject>) -> bool {
        attribute.starts_with(ROLE_PREFIX)
    }

    fn vote_on_attribute(&self, attribute: &str, _subject: Option<&Subject>, identity: &Identity) -> bool {
        self.hierarchy
            .reachable_roles(identity.roles())
            .contains(attribute)
    }
}
