//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, HttpCompletionAdapter},
    config::Config,
    error::ApiError,
    web::{router, state::AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_assistant_core::service::StudyService;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Completion Adapter & Study Service ---
    let completion_adapter = Arc::new(
        HttpCompletionAdapter::new(config.ai_timeout)
            .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?,
    );
    let ai_settings = config.ai_settings();
    match ai_settings.resolve() {
        Ok((provider, _)) => info!(
            provider = provider.kind.as_str(),
            model = %provider.model,
            "Completion provider selected"
        ),
        Err(_) => warn!("OPENAI_API_KEY is not set; generation requests will fail"),
    }
    let study = Arc::new(StudyService::new(completion_adapter, ai_settings));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        study,
    });

    // --- 5. Create the Web Router ---
    let app = router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
