// hackhub-service/src/utils/team_lock.rs
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-team async locks serializing membership changes inside this process.
///
/// A writer on another process sharing the same store is not covered.
#[derive(Clone, Default)]
pub struct TeamLockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl TeamLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Wait for exclusive access to a team; released when the guard drops
    pub async fn acquire(&self, team_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            // Drop entries nobody is holding or waiting on
            locks.retain(|id, lock| id == team_id || Arc::strong_count(lock) > 1);
            locks
                .entry(team_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        debug!("Waiting for team lock: {}", team_id);
        let guard = lock.lock_owned().await;
        debug!("Acquired team lock: {}", team_id);
        guard
    }

    pub fn is_locked(&self, team_id: &str) -> bool {
        let locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks
            .get(team_id)
            .map_or(false, |lock| lock.try_lock().is_err())
    }

    pub fn tracked_teams(&self) -> usize {
        self.locks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}
