use crate::config::{AppConfig, StorageBackend};
use crate::services::email_service::{self, EmailSender};
use crate::services::notification_service::NotificationService;
use crate::utils::fs_backend::FsBackend;
use crate::utils::store::Store;
use crate::utils::team_lock::TeamLockRegistry;
use crate::utils::view_cache::TeamViewCache;
use log::info;
use std::sync::Arc;
use std::time::Duration;

// Shared application state handed to every handler through web::Data
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
    pub notifier: NotificationService,
    pub email: Arc<dyn EmailSender>,
    pub locks: TeamLockRegistry,
    pub views: TeamViewCache,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store, email: Arc<dyn EmailSender>) -> Self {
        let notifier = NotificationService::new(
            store.clone(),
            config.notify_max_attempts,
            Duration::from_millis(config.notify_backoff_ms),
        );
        let views = TeamViewCache::new(Duration::from_secs(config.view_cache_ttl_secs));

        Self {
            config,
            store,
            notifier,
            email,
            locks: TeamLockRegistry::new(),
            views,
        }
    }

    // Build the store and email sender described by the config
    pub fn from_config(config: AppConfig) -> std::io::Result<Self> {
        let store = match &config.storage {
            StorageBackend::Filesystem(root) => {
                info!("📁 Using filesystem storage at {}", root.display());
                Store::new(Arc::new(FsBackend::new(root.clone())?))
            }
            StorageBackend::Memory => {
                info!("🧠 Using in-memory storage");
                Store::memory()
            }
        };
        let email = email_service::create_sender(&config.email);
        Ok(Self::new(config, store, email))
    }
}
