pub mod rooms;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::show_store::ShowStore, error::ServiceError};

pub use self::rooms::{ConnectionId, RoomRegistry};

/// Handle to the application state shared by handlers and tasks.
pub type SharedState = Arc<AppState>;

/// Central application state: storage handle, degraded flag, relay rooms and configuration.
pub struct AppState {
    show_store: RwLock<Option<Arc<dyn ShowStore>>>,
    degraded: watch::Sender<bool>,
    rooms: RoomRegistry,
    config: Arc<AppConfig>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            show_store: RwLock::new(None),
            degraded: degraded_tx,
            rooms: RoomRegistry::new(),
            config: Arc::new(config),
        })
    }

    /// State with `store` already installed and healthy.
    pub fn with_store(config: AppConfig, store: Arc<dyn ShowStore>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            show_store: RwLock::new(Some(store)),
            degraded: degraded_tx,
            rooms: RoomRegistry::new(),
            config: Arc::new(config),
        })
    }

    /// Store to use for a request, or [`ServiceError::Degraded`] while storage is down.
    pub async fn show_store(&self) -> Result<Arc<dyn ShowStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.show_store
            .read()
            .await
            .clone()
            .ok_or(ServiceError::Degraded)
    }

    /// Install a store and leave degraded mode.
    pub async fn set_show_store(&self, store: Arc<dyn ShowStore>) {
        *self.show_store.write().await = Some(store);
        self.update_degraded(false);
    }

    /// Whether storage is currently considered down.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, notifying watchers only on change.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Relay rooms keyed by game id.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Loaded application configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::show_store::MemoryShowStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            state.show_store().await,
            Err(ServiceError::Degraded)
        ));

        state.set_show_store(Arc::new(MemoryShowStore::new())).await;
        assert!(!state.is_degraded());
        assert!(state.show_store().await.is_ok());
    }

    #[tokio::test]
    async fn degraded_flag_hides_an_installed_store() {
        let state = AppState::with_store(AppConfig::default(), Arc::new(MemoryShowStore::new()));
        let mut watcher = state.degraded_watcher();

        state.update_degraded(true);

        assert!(watcher.has_changed().unwrap());
        assert!(*watcher.borrow_and_update());
        assert!(matches!(
            state.show_store().await,
            Err(ServiceError::Degraded)
        ));
    }
}
