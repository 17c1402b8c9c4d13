//! Roster collaborator: which users are in scope for a report, and their
//! team and display attributes.
//!
//! Rosters are stored as TOML:
//!
//! ```toml
//! [[users]]
//! user_id = "jdoe"
//! display_name = "Doe, Jane"
//! team = "Retention East"
//! ```

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Identity as it appears in operational rows.
    pub user_id: String,
    /// Agent label used for the AGENT user grain.
    pub display_name: String,
    /// Team label used for the TEAM user grain.
    pub team: String,
}

impl UserRecord {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            team: team.into(),
        }
    }
}

/// Membership and attribute lookup used by user-grain classification.
pub trait Roster {
    /// Whether `identity` belongs to the configured roster.
    fn has_user(&self, identity: &str) -> bool;

    /// Attributes of `identity`; `None` when it is not in the roster.
    fn get_user(&self, identity: &str) -> Option<&UserRecord>;
}

/// Allow-lists restricting a roster to particular agents and teams.
///
/// Empty lists on both sides mean everyone is in scope. Otherwise a user is
/// in scope when their id or display name is listed in `agent_names`, or
/// their team is listed in `team_names`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterScope {
    #[serde(default)]
    pub agent_names: Vec<String>,
    #[serde(default)]
    pub team_names: Vec<String>,
}

impl RosterScope {
    pub fn is_unrestricted(&self) -> bool {
        self.agent_names.is_empty() && self.team_names.is_empty()
    }

    pub fn admits(&self, user: &UserRecord) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        self.agent_names
            .iter()
            .any(|n| *n == user.user_id || *n == user.display_name)
            || self.team_names.iter().any(|t| *t == user.team)
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Roster held in memory, already filtered to its scope.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoster {
    users: FxHashMap<String, UserRecord>,
}

impl InMemoryRoster {
    /// Build from `records`, keeping only those `scope` admits. A later record
    /// with the same `user_id` replaces an earlier one.
    pub fn new(records: impl IntoIterator<Item = UserRecord>, scope: &RosterScope) -> Self {
        let users = records
            .into_iter()
            .filter(|r| scope.admits(r))
            .map(|r| (r.user_id.clone(), r))
            .collect();
        Self { users }
    }

    /// Parse a roster from TOML text.
    pub fn from_toml_str(text: &str, scope: &RosterScope) -> Result<Self, ConfigError> {
        let file: RosterFile = toml::from_str(text)?;
        Ok(Self::new(file.users, scope))
    }

    /// Load a roster file from disk.
    pub fn load(path: &Path, scope: &RosterScope) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, scope)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Roster for InMemoryRoster {
    fn has_user(&self, identity: &str) -> bool {
        self.users.contains_key(identity)
    }

    fn get_user(&self, identity: &str) -> Option<&UserRecord> {
        self.users.get(identity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
