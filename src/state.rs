use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::{SnippetRepo, UserRepo};
use crate::session::SessionStore;

/// The shared application state.
///
/// All pipeline dependencies are injected here at startup (never ambient
/// globals), so tests can build an isolated state per case. Cloning is cheap;
/// the contained resources are shared handles.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// The server-side session registry.
    pub sessions: SessionStore,
    /// Snippet persistence.
    pub snippets: SnippetRepo,
    /// User persistence and credential checks.
    pub users: UserRepo,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let sessions = SessionStore::new(config.session.lifetime_hours);
        Self {
            snippets: SnippetRepo::new(db.clone()),
            users: UserRepo::new(db.clone()),
            sessions,
            config: Arc::new(config),
            db,
        }
    }
}
