//! Seat lottery backend binary entrypoint wiring REST, SSE, and storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod dto;
mod error;
mod routes;
mod services;
mod state;

use config::AppConfig;
use dao::{session_store::SessionStore, storage::StorageError};
use services::{sse_events, storage_supervisor};
use state::{AppState, SharedState};

/// Environment variable selecting the storage backend (`mongodb` or `firebase`).
const STORE_BACKEND_ENV: &str = "SESSION_STORE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    match select_store_backend() {
        Some(backend) => {
            let supervised = app_state.clone();
            tokio::spawn(storage_supervisor::run(supervised, move || {
                connect_store(backend)
            }));
        }
        None => warn!("no storage backend available; running degraded"),
    }

    tokio::spawn(watch_degraded(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Storage backends this binary was compiled with.
#[derive(Clone, Copy, Debug)]
enum StoreBackend {
    #[cfg(feature = "mongo-store")]
    Mongo,
    #[cfg(feature = "firebase-store")]
    Firebase,
}

/// Pick the storage backend from the environment, defaulting to MongoDB when
/// it was compiled in.
fn select_store_backend() -> Option<StoreBackend> {
    match env::var(STORE_BACKEND_ENV).ok().as_deref() {
        #[cfg(feature = "firebase-store")]
        Some("firebase") => return Some(StoreBackend::Firebase),
        #[cfg(feature = "mongo-store")]
        Some("mongodb") => return Some(StoreBackend::Mongo),
        Some(other) => {
            warn!(
                backend = other,
                "unknown or unavailable session store backend; using the default"
            );
        }
        None => {}
    }

    #[cfg(feature = "mongo-store")]
    return Some(StoreBackend::Mongo);

    #[cfg(all(feature = "firebase-store", not(feature = "mongo-store")))]
    return Some(StoreBackend::Firebase);

    #[cfg(not(any(feature = "mongo-store", feature = "firebase-store")))]
    None
}

/// Establish a connection to the selected backend for the supervisor.
async fn connect_store(backend: StoreBackend) -> Result<Arc<dyn SessionStore>, StorageError> {
    match backend {
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            use crate::dao::session_store::mongodb::{MongoConfig, MongoSessionStore};

            let config = MongoConfig::from_env().await?;
            let store = MongoSessionStore::connect(config).await?;
            Ok(Arc::new(store) as Arc<dyn SessionStore>)
        }
        #[cfg(feature = "firebase-store")]
        StoreBackend::Firebase => {
            use crate::dao::session_store::firebase::{FirebaseConfig, FirebaseSessionStore};

            let config = FirebaseConfig::from_env()?;
            let store = FirebaseSessionStore::connect(config).await?;
            Ok(Arc::new(store) as Arc<dyn SessionStore>)
        }
    }
}

/// Mirror degraded-mode changes onto every live session stream.
async fn watch_degraded(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    loop {
        if watcher.changed().await.is_err() {
            break;
        }
        let degraded = *watcher.borrow_and_update();
        sse_events::broadcast_system_status(&state, degraded);
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
