use homenest_api::{AppConfig, AppState, StorageContext, app, lifecycle};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("🚀 Starting HomeNest API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Database: {} ({:?})", config.database.name, config.database.backend);
    info!("   - Server: {}", config.listen_addr());

    // Connect in the background; routes answer DB_NOT_INITIALIZED until this completes
    let storage = Arc::new(StorageContext::new());
    {
        let storage = storage.clone();
        let database = config.database.clone();
        tokio::spawn(async move {
            info!("🔌 Connecting to database...");
            storage.connect(&database).await;
        });
    }

    let app = app(AppState::new(storage.clone()));

    // Start server
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /                    - Liveness");
    info!("   POST   /property            - Add property");
    info!("   POST   /properties          - Add property");
    info!("   GET    /all-properties      - All properties, newest first");
    info!("   GET    /latest-properties   - Six newest properties");
    info!("   GET    /property?email=     - Properties by owner");
    info!("   GET    /property/{{id}}       - Property by id");
    info!("   PATCH  /property/{{id}}       - Update property fields");
    info!("   DELETE /property/{{id}}       - Delete property");
    info!("   POST   /ratings             - Add rating");
    info!("   GET    /ratings?email=      - Ratings by reviewer");
    info!("   DELETE /ratings/{{id}}        - Delete rating");

    axum::serve(listener, app)
        .with_graceful_shutdown(lifecycle::shutdown_on(lifecycle::os_signal(), storage))
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}
