//! Application state shared with every request handler.
//!
//! The store connection is guarded by a mutex and only used from actix's
//! blocking pool through `AppState::with_store`, so handlers never block the
//! async workers on SQLite.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::media::MediaStore;
use crate::store::Store;
use actix_web::{web, HttpRequest};
use std::sync::{Arc, Mutex};

pub const ADMIN_PASSWORD_HEADER: &str = "X-Admin-Password";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub config: Arc<AppConfig>,
    pub media: MediaStore,
}

impl AppState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        let media = MediaStore::new(&config.media_dir, &config.media_url);
        Self {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(config),
            media,
        }
    }

    /// Runs `f` with exclusive access to the store on the blocking pool.
    pub async fn with_store<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Store) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        web::block(move || {
            let mut guard = store
                .lock()
                .map_err(|_| AppError::Io(std::io::Error::other("store lock poisoned")))?;
            f(&mut guard)
        })
        .await?
    }

    pub fn password_matches(&self, candidate: &str) -> bool {
        let expected = self.config.admin_password.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.is_empty() || expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Rejects requests without the configured admin password header.
    pub fn require_admin(&self, req: &HttpRequest) -> AppResult<()> {
        let provided = req
            .headers()
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if self.password_matches(provided) {
            Ok(())
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
