//! Application state shared across handlers.

use std::sync::Arc;

use luxe_client::{ApiError, ProductApi};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the products API client.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ProductApi,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ProductApi::new(&config.api)?;
        Ok(Self::with_api(config, api))
    }

    /// Create application state around an existing API client.
    #[must_use]
    pub fn with_api(config: StorefrontConfig, api: ProductApi) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, api }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the products API client.
    #[must_use]
    pub fn api(&self) -> &ProductApi {
        &self.inner.api
    }
}
