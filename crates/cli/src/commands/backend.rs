//! Backend connectivity check.
//!
//! ```bash
//! jq-cli backend check
//! ```

use juicequ_storefront::backend::{ApiError, BackendClient};
use juicequ_storefront::config::{BackendConfig, ConfigError};
use thiserror::Error;

/// Errors from the backend check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ApiError),

    #[error("Backend at {0} is not healthy")]
    Unhealthy(String),
}

/// Call the backend health endpoint with the storefront's settings.
pub async fn check() -> Result<(), CheckError> {
    dotenvy::dotenv().ok();
    let config = BackendConfig::from_env()?;
    let client = BackendClient::new(&config)?;

    tracing::info!("Checking {}...", config.base_url);
    if client.is_healthy().await {
        tracing::info!("Backend is healthy");
        Ok(())
    } else {
        Err(CheckError::Unhealthy(config.base_url.to_string()))
    }
}
