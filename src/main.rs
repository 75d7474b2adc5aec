use anyhow::{Context, Result};
use listing_translator::{
    config::Config,
    dispatcher::Dispatcher,
    engine::TranslationEngine,
    metrics::TranslationMetrics,
    server::{router, AppState},
    store::{ListingStore, MemoryListingStore, PgListingStore},
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("listing_translator=info".parse()?),
        )
        .init();

    info!("Starting listing translation service");

    let config = Config::from_env()?;
    let targets = Arc::new(config.targets.clone());

    info!(
        "Translating into {} languages: {}",
        targets.len(),
        targets.language_names().join(", ")
    );
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY not set, every translation will fall back to MyMemory");
    }

    let store: Arc<dyn ListingStore> = match &config.database_url {
        Some(url) => Arc::new(
            PgListingStore::connect(url, Arc::clone(&targets))
                .await
                .context("Failed to connect to database")?,
        ),
        None => {
            warn!("DATABASE_URL not set, using in-memory listing store");
            Arc::new(MemoryListingStore::new(Arc::clone(&targets)))
        }
    };

    let metrics = Arc::new(TranslationMetrics::new());
    let engine = Arc::new(TranslationEngine::from_config(
        &config,
        Arc::clone(&store),
        Arc::clone(&metrics),
    )?);
    let dispatcher = Dispatcher::new(
        Arc::clone(&engine),
        config.max_concurrent_dispatches,
        Arc::clone(&metrics),
    );

    let app = router(Arc::new(AppState {
        store,
        engine,
        dispatcher,
        metrics,
    }));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("✓ Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
