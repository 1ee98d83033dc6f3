//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::Store;

use crate::config::ServerConfig;
use crate::mail::Mailer;
use crate::upload::AvatarStore;

/// Application state shared across all handlers.
///
/// Cloneable; extracted in handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Database store.
    store: Arc<Store>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Transactional mail collaborator.
    mailer: Arc<dyn Mailer>,
    /// Avatar file storage.
    avatars: Arc<AvatarStore>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        store: Store,
        config: ServerConfig,
        mailer: Arc<dyn Mailer>,
        avatars: AvatarStore,
    ) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            mailer,
            avatars: Arc::new(avatars),
        }
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the mail collaborator.
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Get a reference to the avatar file store.
    pub fn avatars(&self) -> &AvatarStore {
        &self.avatars
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
