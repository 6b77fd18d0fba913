use anyhow::Error as AnyhowError;
use server::{AppState, config::Config, file_logging, routes};
use services::services::auth::AuthError;
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskboardError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sqlx(#[from] SqlxError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

#[tokio::main]
async fn main() -> Result<(), TaskboardError> {
    // Load .env file if present (for development)
    dotenvy::dotenv().ok();

    // The guard must be held for the lifetime of the application to ensure
    // buffered file logs are flushed
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _file_log_guard = file_logging::init_logging(&log_level);

    let config = Config::from_env();

    // Create the upload directory if it doesn't exist
    if !config.upload_dir.exists() {
        std::fs::create_dir_all(&config.upload_dir)?;
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Taskboard server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
