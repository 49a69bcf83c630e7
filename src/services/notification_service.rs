// hackhub-service/src/services/notification_service.rs
use crate::models::{DeadLetter, Notification, NotificationDelivery};
use crate::utils::store::Store;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Inserts notifications with a bounded retry. Inserts that still fail go to
/// the dead-letter list instead of failing the caller.
#[derive(Clone)]
pub struct NotificationService {
    store: Store,
    max_attempts: u32,
    backoff: Duration,
    dead_letters: Arc<Mutex<Vec<DeadLetter>>>,
}

impl NotificationService {
    pub fn new(store: Store, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            backoff,
            dead_letters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn deliver(&self, notification: Notification) -> NotificationDelivery {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.store.insert_notification(&notification) {
                Ok(()) => {
                    info!(
                        "🔔 Notification {} ({:?}) delivered to user: {}",
                        notification.id, notification.kind, notification.user_id
                    );
                    return NotificationDelivery::Delivered {
                        notification_id: notification.id,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(
                        "⚠️ Notification insert attempt {}/{} failed: {}",
                        attempt, self.max_attempts, e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.backoff * attempt).await;
                    }
                }
            }
        }

        error!(
            "❌ Dead-lettering notification {} for user {} after {} attempts: {}",
            notification.id, notification.user_id, self.max_attempts, last_error
        );
        self.dead_letters
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(DeadLetter {
                notification,
                attempts: self.max_attempts,
                last_error: last_error.clone(),
                failed_at: Utc::now(),
            });

        NotificationDelivery::DeadLettered {
            attempts: self.max_attempts,
            error: last_error,
        }
    }

    /// Deliver to a user if there is one; invitees without an account are skipped.
    pub async fn notify<F>(&self, user_id: Option<&str>, build: F) -> NotificationDelivery
    where
        F: FnOnce(&str) -> Notification,
    {
        match user_id {
            Some(user_id) => self.deliver(build(user_id)).await,
            None => NotificationDelivery::Skipped,
        }
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
