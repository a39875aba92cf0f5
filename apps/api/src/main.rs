mod config;
mod credential;
mod db;
mod errors;
mod llm_client;
mod menus;
mod routes;
mod schema;
mod settings;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::credential::ApiCredential;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::menus::store::{MenuSource, PgMenuSource};
use crate::routes::build_router;
use crate::schema::generator::SchemaGenerator;
use crate::schema::prior::{
    CapturedRender, HomepageFetcher, PriorDocumentSource, StaticMarkupRenderer,
};
use crate::schema::publisher::Publisher;
use crate::settings::{disable_competing_renderer, RedisSettingsStore, SettingsStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting LocalBusiness schema service v{}", env!("CARGO_PKG_VERSION"));

    // Fail fast: the key file must exist and decode
    let credential = ApiCredential::load(&config.api_key_file)
        .context("Cannot start without a usable completion API key")?;

    // Initialize PostgreSQL (navigation menus)
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let menus: Arc<dyn MenuSource> = Arc::new(PgMenuSource::new(pool));

    // Initialize Redis (settings store)
    let redis = redis::Client::open(config.redis_url.as_str())?;
    info!("Redis settings store initialized");
    let settings: Arc<dyn SettingsStore> = Arc::new(RedisSettingsStore::new(redis));

    // Activation: make sure only this service emits a LocalBusiness block
    disable_competing_renderer(settings.as_ref(), &config.competing_renderer).await?;

    // Initialize LLM client
    let llm = LlmClient::with_endpoint(credential, config.completions_url.clone())?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm_client::MODEL,
        llm.endpoint()
    );

    let prior = build_prior_source(&config)?;

    let generator = Arc::new(SchemaGenerator::new(
        menus,
        prior,
        Arc::new(llm),
    ));
    let publisher = Arc::new(Publisher::new(
        settings.clone(),
        generator,
        config.persist_generated,
    ));
    info!(
        "Publisher ready (persist_generated: {})",
        config.persist_generated
    );

    // Build app state
    let state = AppState {
        settings,
        publisher,
        competing_renderer: config.competing_renderer.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict admin routes to the CMS origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Picks the prior-document strategy: captured legacy markup when
/// `LEGACY_HEAD_FILE` is set, otherwise a self-fetch of the homepage.
fn build_prior_source(config: &Config) -> Result<Arc<dyn PriorDocumentSource>> {
    match &config.legacy_head_file {
        Some(path) => {
            let markup = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read LEGACY_HEAD_FILE '{}'", path.display()))?;
            info!("Prior document: captured legacy render from {}", path.display());
            Ok(Arc::new(CapturedRender::new(StaticMarkupRenderer::new(
                markup,
            ))))
        }
        None => {
            info!("Prior document: homepage self-fetch from {}", config.site_url);
            Ok(Arc::new(HomepageFetcher::with_timeout(
                config.site_url.clone(),
                llm_client::HTTP_TIMEOUT,
            )?))
        }
    }
}
