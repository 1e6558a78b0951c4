//! CLI command implementations.

pub mod bulk;
pub mod catalog;

use luxe_client::{ApiConfig, ApiError, ProductApi};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// API configuration is invalid.
    #[error(transparent)]
    Config(#[from] luxe_client::ConfigError),

    /// Products API call failed.
    #[error("Products API error: {0}")]
    Api(#[from] ApiError),

    /// Argument is not a valid product id.
    #[error("Invalid product id: {0}")]
    InvalidId(String),

    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The API reported failure without details.
    #[error("{0}")]
    Rejected(String),

    /// Local file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the API client from the environment.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the client cannot be
/// built.
pub fn connect() -> Result<ProductApi, CommandError> {
    let config = ApiConfig::from_env()?;
    tracing::debug!(api = %config.base_url, env = %config.environment, "Using products API");
    Ok(ProductApi::new(&config)?)
}
