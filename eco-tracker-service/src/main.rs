use eco_tracker_service::config::EcoConfig;
use eco_tracker_service::services::init_metrics;
use eco_tracker_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = EcoConfig::load()?;

    init_tracing(
        "eco-tracker-service",
        &config.observability.log_level,
        config.observability.otlp_endpoint.as_deref(),
    )?;

    // Must be installed before any metric is recorded
    init_metrics()?;

    tracing::info!(
        version = %env!("CARGO_PKG_VERSION"),
        store = ?config.store,
        database = %config.mongodb.database,
        "Starting eco-tracker-service"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    tracing::info!("Server stopped");
    Ok(())
}
