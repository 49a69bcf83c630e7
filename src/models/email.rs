use serde::{Deserialize, Serialize};

// Body accepted by the email functions
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamEmailRequest {
    pub recipient_email: String,
    pub recipient_name: String,
    pub team_name: String,
    pub hackathon_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    TeamInvitation,
    ApplicationApproved,
    ApplicationRejected,
    MemberRemoved,
}

impl TeamEmailRequest {
    // removed wins over approved; neither means an invitation
    pub fn kind(&self) -> EmailKind {
        if self.removed == Some(true) {
            return EmailKind::MemberRemoved;
        }
        match self.approved {
            Some(true) => EmailKind::ApplicationApproved,
            Some(false) => EmailKind::ApplicationRejected,
            None => EmailKind::TeamInvitation,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}
