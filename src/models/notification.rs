use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    LeadershipTransferred,
    TeamInvite,
    MemberRemoved,
    ApplicationReviewed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub metadata: Map<String, Value>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: &str, kind: NotificationKind, title: &str, message: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            metadata: Map::new(),
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// What happened to a queued notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationDelivery {
    Delivered { notification_id: String, attempts: u32 },
    /// Recipient has no account yet.
    Skipped,
    DeadLettered { attempts: u32, error: String },
}

/// Notification that exhausted its retries.
#[derive(Serialize, Debug, Clone)]
pub struct DeadLetter {
    pub notification: Notification,
    pub attempts: u32,
    pub last_error: String,
    pub failed_at: DateTime<Utc>,
}
