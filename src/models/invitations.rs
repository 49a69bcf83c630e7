// hackhub-service/src/models/invitations.rs
use serde::{Deserialize, Serialize};

use super::{Team, TeamMember};

// Request to invite someone to a team by email
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateInvitationRequest {
    pub email: String,
}

// Pending invitation as shown to the invitee
#[derive(Serialize, Deserialize, Debug)]
pub struct PendingInvitation {
    pub member_id: String,
    pub team_id: String,
    pub team_name: Option<String>,
    pub hackathon_id: Option<String>,
    pub email: String,
}

impl PendingInvitation {
    pub fn new(member: &TeamMember, team: Option<&Team>) -> Self {
        Self {
            member_id: member.id.clone(),
            team_id: member.team_id.clone(),
            team_name: team.map(|t| t.name.clone()),
            hackathon_id: team.map(|t| t.hackathon_id.clone()),
            email: member.email.clone(),
        }
    }
}

// Response when answering an invitation
#[derive(Serialize, Deserialize, Debug)]
pub struct InvitationResponse {
    pub member_id: String,
    pub accepted: bool,
    pub message: String,
}
