//! User-grain bucket labels: the agent itself, or the agent's team.
//!
//! Classification assumes the user is present in the roster. Callers check
//! [`Roster::has_user`] (or use [`classify_user`], which does) and drop rows
//! for users outside the roster instead of aggregating them.

use serde::Serialize;

use crate::error::{ReportError, ReportResult};
use crate::roster::{Roster, UserRecord};

/// Organizational granularity selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserGrain {
    #[default]
    Agent,
    Team,
}

impl UserGrain {
    pub fn from_code(code: i64) -> ReportResult<Self> {
        match code {
            1 => Ok(Self::Agent),
            2 => Ok(Self::Team),
            other => Err(ReportError::Config(format!(
                "unrecognized user grain code {other}"
            ))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Agent => 1,
            Self::Team => 2,
        }
    }
}

impl std::fmt::Display for UserGrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Team => write!(f, "team"),
        }
    }
}

/// Bucket label for `user` at `grain`.
pub fn user_grain(grain: UserGrain, user: &UserRecord) -> String {
    match grain {
        UserGrain::Agent => user.display_name.clone(),
        UserGrain::Team => user.team.clone(),
    }
}

/// Resolve `identity` through `roster` and classify it.
///
/// `None` means the identity is not in the roster and the row is out of scope.
pub fn classify_user<R: Roster + ?Sized>(
    roster: &R,
    grain: UserGrain,
    identity: &str,
) -> Option<String> {
    if !roster.has_user(identity) {
        return None;
    }
    roster.get_user(identity).map(|user| user_grain(grain, user))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{InMemoryRoster, RosterScope};

    fn roster() -> InMemoryRoster {
        InMemoryRoster::new(
            vec![
                UserRecord::new("userA", "Agent A", "teamX"),
                UserRecord::new("userB", "Agent B", "teamX"),
            ],
            &RosterScope::default(),
        )
    }

    #[test]
    fn agent_and_team_labels() {
        let user = UserRecord::new("userA", "Agent A", "teamX");
        assert_eq!(user_grain(UserGrain::Agent, &user), "Agent A");
        assert_eq!(user_grain(UserGrain::Team, &user), "teamX");
    }

    #[test]
    fn classify_user_resolves_through_roster() {
        let roster = roster();
        assert_eq!(
            classify_user(&roster, UserGrain::Team, "userB").as_deref(),
            Some("teamX")
        );
        assert_eq!(
            classify_user(&roster, UserGrain::Agent, "userA").as_deref(),
            Some("Agent A")
        );
    }

    #[test]
    fn classify_user_absent_is_out_of_scope() {
        assert_eq!(classify_user(&roster(), UserGrain::Team, "ghost"), None);
    }

    #[test]
    fn codes() {
        assert_eq!(UserGrain::from_code(1).unwrap(), UserGrain::Agent);
        assert_eq!(UserGrain::from_code(2).unwrap(), UserGrain::Team);
        assert_eq!(UserGrain::from_code(3).unwrap_err().kind(), "config");
        assert_eq!(UserGrain::Team.code(), 2);
        assert_eq!(UserGrain::Team.to_string(), "team");
    }
}
