use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Hackathon {
    pub id: String,
    pub name: String,
    pub organizer_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HackathonData {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

// A team's application to take part in a hackathon
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Application {
    pub id: String,
    pub hackathon_id: String,
    pub team_id: String,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApplyRequest {
    pub team_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReviewRequest {
    pub approved: bool,
}
