//! Quiz show backend entrypoint wiring REST, the WebSocket relay and the storage backend.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::{Context, bail};
use axum::{Router, http::HeaderValue};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quiz_show_back::{
    config::AppConfig,
    dao::show_store::{MemoryShowStore, ShowStore},
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    start_storage(&app_state)?;
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

/// Install the storage backend named by `STORAGE_BACKEND` under the supervisor.
fn start_storage(state: &SharedState) -> anyhow::Result<()> {
    let backend = env::var(STORAGE_BACKEND_ENV).unwrap_or_else(|_| "memory".into());
    info!(backend = %backend, "selecting storage backend");

    match backend.as_str() {
        "memory" => {
            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                Ok(Arc::new(MemoryShowStore::new()) as Arc<dyn ShowStore>)
            }));
        }
        #[cfg(feature = "mongo-store")]
        "mongo" => {
            use quiz_show_back::dao::show_store::mongodb::{MongoConfig, MongoShowStore};

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoShowStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn ShowStore>)
            }));
        }
        #[cfg(feature = "couch-store")]
        "couch" => {
            use quiz_show_back::dao::show_store::couchdb::{CouchConfig, CouchShowStore};

            tokio::spawn(storage_supervisor::run(state.clone(), || async {
                let config = CouchConfig::from_env()?;
                let store = CouchShowStore::connect(config).await?;
                Ok(Arc::new(store) as Arc<dyn ShowStore>)
            }));
        }
        other => bail!("unsupported {STORAGE_BACKEND_ENV} `{other}`"),
    }

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    let cors = cors_layer(&state.config().cors_origins);
    routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Permissive CORS unless origins are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(origin = %origin, error = %err, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
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

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutdown signal received");
}
