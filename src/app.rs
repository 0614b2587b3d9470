/*
 * Responsibility
 * - Config -> data store -> services -> Router
 * - Tracing and panic hook setup
 * - axum::serve() with connect info (client IP fallback)
 */
use std::net::SocketAddr;
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::{DataStore, MemoryStore, PgStore};
use crate::services::factory;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins; e.g. RUST_LOG=info,graphgate=debug,tripwire=error
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash loudly. Production: default hook, server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting in {:?} mode on {} (jwt {})",
        config.app_env,
        config.addr,
        if config.jwt_enabled { "enabled" } else { "disabled" }
    );

    let store = connect_store(&config).await?;
    let state = build_state(&config, store)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn connect_store(config: &Config) -> Result<Arc<dyn DataStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await?;
            tracing::info!("connected to postgres");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub fn build_state(config: &Config, store: Arc<dyn DataStore>) -> Result<AppState> {
    let facade = factory::build_identity_facade(config, store)?;
    let decider = factory::build_decider(config);
    let resolver = factory::build_field_resolver(config)?;

    Ok(AppState::new(facade, decider, resolver, config.auth_settings()))
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state);

    middleware::http::apply(router)
}
