pub mod screen;
mod streams;

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::session_store::SessionStore, error::ServiceError};

pub use self::streams::{SessionStreams, SseHub};

pub type SharedState = Arc<AppState>;

/// Channel capacity for each per-session SSE hub.
const SESSION_STREAM_CAPACITY: usize = 16;

/// Central application state storing the storage handle and live SSE hubs.
pub struct AppState {
    config: AppConfig,
    store: RwLock<Option<Arc<dyn SessionStore>>>,
    streams: SessionStreams,
    degraded: watch::Sender<bool>,
    draws_in_flight: DashMap<(String, String), ()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            store: RwLock::new(None),
            streams: SessionStreams::new(SESSION_STREAM_CAPACITY),
            degraded: degraded_tx,
            draws_in_flight: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current session store, if one is installed.
    pub async fn session_store(&self) -> Option<Arc<dyn SessionStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the session store or fail with the degraded-mode error.
    pub async fn require_session_store(&self) -> Result<Arc<dyn SessionStore>, ServiceError> {
        self.session_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new session store implementation and leave degraded mode.
    pub async fn set_session_store(&self, store: Arc<dyn SessionStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Per-session broadcast hubs used for the SSE mirror streams.
    pub fn streams(&self) -> &SessionStreams {
        &self.streams
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Reserve the (session, participant) draw slot, rejecting resubmission
    /// while a draw for the same name is still settling.
    pub fn begin_draw(state: &SharedState, session_id: &str, name_key: &str) -> Option<DrawGuard> {
        let key = (session_id.to_owned(), name_key.to_owned());
        match state.draws_in_flight.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(DrawGuard {
                    state: Arc::clone(state),
                    key,
                })
            }
        }
    }
}

/// Releases the draw slot when the draw settles, whatever the outcome.
pub struct DrawGuard {
    state: SharedState,
    key: (String, String),
}

impl Drop for DrawGuard {
    fn drop(&mut self) {
        self.state.draws_in_flight.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_draw_rejects_concurrent_resubmission() {
        let state = AppState::new(AppConfig::default());

        let guard = AppState::begin_draw(&state, "AB12CD", "ALICE");
        assert!(guard.is_some());
        assert!(AppState::begin_draw(&state, "AB12CD", "ALICE").is_none());
        // A different participant in the same session is unaffected.
        assert!(AppState::begin_draw(&state, "AB12CD", "BOB").is_some());

        drop(guard);
        assert!(AppState::begin_draw(&state, "AB12CD", "ALICE").is_some());
    }
}
