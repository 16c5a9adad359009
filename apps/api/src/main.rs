mod assessment;
mod cache;
mod config;
mod consistency;
mod custom;
mod db;
mod errors;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::{MemoryProfileCache, PgProfileCache, ProfileCache};
use crate::config::{CacheBackend, Config};
use crate::consistency::CrossValidator;
use crate::db::{create_pool, run_migrations};
use crate::matching::MappingTable;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PsyFit API v{}", env!("CARGO_PKG_VERSION"));

    let mapping = match &config.competency_mapping_path {
        Some(path) => MappingTable::load(path)
            .with_context(|| format!("failed to load competency mapping from {}", path.display()))?,
        None => MappingTable::builtin().context("built-in competency mapping is invalid")?,
    };
    anyhow::ensure!(!mapping.is_empty(), "competency mapping defines no rules");
    let aliases: usize = mapping.rules().iter().map(|rule| rule.aliases.len()).sum();
    info!(
        "Competency mapping loaded ({} rules, {} aliases)",
        mapping.len(),
        aliases
    );

    let cross_validator = CrossValidator::builtin();
    info!("Cross-validator ready ({} traits)", cross_validator.traits().len());

    let cache = build_cache(&config).await?;

    let state = AppState {
        mapping: Arc::new(mapping),
        cross_validator: Arc::new(cross_validator),
        cache,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Selects the profile cache backend from `CACHE_BACKEND`.
async fn build_cache(config: &Config) -> Result<Arc<dyn ProfileCache>> {
    match (config.cache_backend, config.database_url.as_deref()) {
        (CacheBackend::Postgres, Some(database_url)) => {
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            info!("Profile cache backed by PostgreSQL");
            Ok(Arc::new(PgProfileCache::new(pool)))
        }
        (CacheBackend::Postgres, None) => {
            anyhow::bail!("CACHE_BACKEND=postgres requires DATABASE_URL")
        }
        (CacheBackend::Memory, _) => {
            info!("Profile cache held in memory; entries are lost on restart");
            Ok(Arc::new(MemoryProfileCache::new()))
        }
    }
}
