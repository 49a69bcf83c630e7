use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Profile;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub hackathon_id: String,
    /// User id of the team leader. Mirrors the accepted `leader` member row,
    /// and is None only if leadership went to a member without an account.
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    Leader,
    Member,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TeamMember {
    pub id: String,
    pub team_id: String,
    /// None while the invitee has no account.
    pub user_id: Option<String>,
    pub email: String,
    pub role: TeamRole,
    pub accepted: bool,
    pub invited_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl TeamMember {
    // Accepted leader row for the user creating a team
    pub fn founding_leader(team_id: &str, user_id: &str, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            user_id: Some(user_id.to_string()),
            email: email.to_string(),
            role: TeamRole::Leader,
            accepted: true,
            invited_at: now,
            joined_at: Some(now),
        }
    }

    // Pending invitation row
    pub fn invited(team_id: &str, email: &str, user_id: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            user_id,
            email: email.to_string(),
            role: TeamRole::Member,
            accepted: false,
            invited_at: Utc::now(),
            joined_at: None,
        }
    }
}

impl Team {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeamData {
    pub name: String,
}

/// A member row joined with its profile (if the member has one).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MemberWithProfile {
    #[serde(flatten)]
    pub member: TeamMember,
    pub display_name: String,
    pub profile: Option<Profile>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TransferLeadershipRequest {
    pub member_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RemoveMemberRequest {
    pub reason: Option<String>,
}
