//! Application state shared across handlers.

use std::sync::Arc;

use luxe_client::{ApiError, ProductApi};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    api: ProductApi,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AdminConfig) -> Result<Self, ApiError> {
        let api = ProductApi::new(&config.api)?;
        Ok(Self::with_api(config, api))
    }

    /// Create application state around an existing API client.
    #[must_use]
    pub fn with_api(config: AdminConfig, api: ProductApi) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, api }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ProductApi {
        &self.inner.api
    }
}
