mod config;
mod domain;
mod error;
mod handlers;
mod middleware;
mod repositories;
mod routes;
mod services;
mod utils;

use config::AppState;
use routes::create_routes;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point dari Quotation Service
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Setup logging dengan environment
    setup_logging();

    // Create application state (includes database connection)
    let app_state = AppState::from_env().await.map_err(|e| {
        error!("Failed to start Quotation Service: {}", e);
        e
    })?;

    if app_state.config.run_migrations {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&app_state.db).await?;
    }

    info!(
        "Quotation Service starting on {} | company: {} | quote validity: {} days",
        app_state.config.bind_address(),
        app_state.config.company_name,
        app_state.config.quote_validity_days
    );

    // Build dan start server dengan graceful shutdown
    start_server(app_state).await
}

/// Inisialisasi structured logging berdasarkan environment
fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("quotation_service=debug,tower_http=debug")
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Start server dengan graceful shutdown
async fn start_server(app_state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let address = app_state.config.bind_address();
    let app = create_routes(app_state)?;

    // Bind listener ke configured address
    let listener = TcpListener::bind(&address).await?;

    info!("Server running on http://{}", address);
    info!("API Docs: http://{}/docs", address);
    info!("Health Check: http://{}/health", address);

    // Setup graceful shutdown signal handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Quotation Service shutdown successfully");
    Ok(())
}
