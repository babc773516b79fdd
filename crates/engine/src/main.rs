//! hexrealm engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexrealm_engine::api::{self, ConnectionManager};
use hexrealm_engine::infrastructure::{
    art_service::{HttpArtService, UnconfiguredArtService},
    config::EngineConfig,
    ports::ArtGenPort,
    sqlite::SqliteRepositories,
};
use hexrealm_engine::App;

/// How often expired wizard scratch records are swept.
const SCRATCH_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexrealm_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hexrealm engine");

    let config = EngineConfig::from_env();

    tracing::info!(database_url = %config.database_url, "Opening world store");
    let repos = SqliteRepositories::connect(&config.database_url).await?;

    let art: Arc<dyn ArtGenPort> = match &config.art_service_url {
        Some(url) => {
            tracing::info!(%url, "Art service configured");
            Arc::new(HttpArtService::new(url, config.art_service_timeout))
        }
        None => {
            tracing::warn!("ART_SERVICE_URL not set, rooms will have no animations");
            Arc::new(UnconfiguredArtService)
        }
    };

    let connections = Arc::new(ConnectionManager::new());
    let app = Arc::new(App::new(&repos, art, connections.clone(), &config));

    // Sweep expired wizard scratch records
    let wizard_store = app.stores.wizard.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SCRATCH_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = wizard_store.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Swept expired wizard sessions");
            }
        }
    });

    let mut router = api::router(app, connections).layer(TraceLayer::new_for_http());
    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
