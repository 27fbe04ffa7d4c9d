use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use ups_core::config::dismiss_prefix_from_env_value;
use ups_core::{CoreConfig, FilePropertyStore, NoticeService};

/// Main entry point for the UPS application
///
/// Starts the REST server on port 3000 (configurable via UPS_REST_ADDR).
///
/// Every user-facing endpoint requires the gateway headers `x-api-key` and `x-user-uuid`.
///
/// # Environment Variables
/// - `UPS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PROPERTY_DATA_DIR`: Directory for property storage (default: "property_data")
/// - `UPS_DISMISS_PREFIX`: Storage key prefix for dismissed notices
///   (default: "user.dismissedNotices.")
/// - `API_KEY`: API key the gateway must present (required)
///
/// # Errors
/// Returns an error if:
/// - `API_KEY` is not set,
/// - the configuration is invalid or the property directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ups_run=info".parse()?)
                .add_directive("ups_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("UPS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let api_key = match std::env::var("API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => anyhow::bail!("API_KEY must be set"),
    };

    let property_data_dir = std::env::var("PROPERTY_DATA_DIR")
        .unwrap_or_else(|_| ups_core::DEFAULT_PROPERTY_DATA_DIR.into());
    let dismiss_prefix = dismiss_prefix_from_env_value(std::env::var("UPS_DISMISS_PREFIX").ok());

    let cfg = Arc::new(CoreConfig::new(
        PathBuf::from(property_data_dir),
        dismiss_prefix,
    )?);
    let store = Arc::new(FilePropertyStore::new(&cfg)?);

    tracing::info!(
        "++ Property store at {} (prefix '{}')",
        store.properties_dir().display(),
        cfg.dismiss_prefix()
    );

    let state = AppState::new(NoticeService::new(cfg, store), api_key);
    let app = api_rest::router(state);

    tracing::info!("++ Starting UPS REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("-- Shutting down UPS REST");
}
