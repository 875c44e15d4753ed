use sea_orm::Database;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paynow_order_sync::{
    services::paynow::PayNowService, OrderSyncJob, SyncConfig, SyncError, SyncResult,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paynow_order_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Credentials are checked before any network or database activity
    let config = match SyncConfig::from_env() {
        Ok(config) => config,
        Err(SyncError::MissingConfig(name)) => {
            tracing::error!("Missing PayNow API Key or Store ID ({} is not set)", name);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        // Any failed run, including a malformed API response, exits non-zero
        // so the scheduler sees it.
        Err(e) => {
            tracing::error!("Order sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &SyncConfig) -> SyncResult<()> {
    tracing::info!("Connecting to database...");
    let db = Database::connect(config.database.connect_options()?).await?;

    let job = OrderSyncJob::new(PayNowService::new(&config.paynow));
    let result = job.run(&db).await;

    if let Err(e) = db.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }

    let report = result?;
    tracing::info!(
        pages = report.pages_fetched,
        orders = report.orders_processed,
        upserted = report.rows_upserted,
        "Order sync complete"
    );

    Ok(())
}
