//! Products API client implementation.
//!
//! Uses `reqwest` 0.13 with a shared connection pool. Requests carry JSON
//! content type and, when configured, a bearer token as default headers.

use std::sync::Arc;

use luxe_core::{Category, Product, ProductDraft, ProductId};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::config::ApiConfig;
use crate::{ApiError, truncate};

/// Query string accepted by `GET /Products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProductQuery {
    /// Every product, no filters.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Featured, in-stock products for the home page.
    #[must_use]
    pub const fn featured(page_size: u32) -> Self {
        Self {
            page: Some(1),
            page_size: Some(page_size),
            is_featured: Some(true),
            in_stock: Some(true),
            search: None,
        }
    }

    /// Server-side search on name.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

// =============================================================================
// ProductApi
// =============================================================================

/// Client for the products REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ProductApi {
    inner: Arc<ProductApiInner>,
}

struct ProductApiInner {
    client: reqwest::Client,
    base_url: String,
}

impl ProductApi {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built
    /// (for example, TLS backend initialization failure).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token
            && let Ok(mut value) =
                HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            inner: Arc::new(ProductApiInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        debug!(%method, %url, "Products API request");
        self.inner.client.request(method, url)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.inspect_err(|e| {
            error!(error = %e, "Products API request failed");
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Products API response");

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&body),
                "Products API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: truncate(&body),
            });
        }

        Ok(body)
    }

    async fn execute_json(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let body = self.execute(request).await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse Products API response"
            );
            ApiError::Decode(e)
        })
    }

    // =========================================================================
    // Reads (fail-soft)
    // =========================================================================

    /// Fetch products matching `query`.
    ///
    /// Returns an empty list on any failure. Elements that do not decode as a
    /// product are skipped.
    #[instrument(skip(self))]
    pub async fn get_all_products(&self, query: &ProductQuery) -> Vec<Product> {
        match self
            .execute_json(self.request(Method::GET, "Products").query(query))
            .await
        {
            Ok(value) => decode_list(value, "product"),
            Err(e) => {
                warn!(error = %e, "Returning no products");
                Vec::new()
            }
        }
    }

    /// Fetch all categories. Returns an empty list on any failure.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Vec<Category> {
        match self.execute_json(self.request(Method::GET, "Categories")).await {
            Ok(value) => decode_list(value, "category"),
            Err(e) => {
                warn!(error = %e, "Returning no categories");
                Vec::new()
            }
        }
    }

    /// Fetch a single product. `None` when missing or on any failure.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product_by_id(&self, id: ProductId) -> Option<Product> {
        let value = match self
            .execute_json(self.request(Method::GET, &format!("Products/{id}")))
            .await
        {
            Ok(value) => value,
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                debug!("Product not found");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Returning no product");
                return None;
            }
        };
        decode_one(value, "product")
    }

    /// Total number of products. `0` on any failure.
    ///
    /// Accepts either a bare number or an object with a `count` field.
    #[instrument(skip(self))]
    pub async fn get_products_count(&self) -> u64 {
        match self
            .execute_json(self.request(Method::GET, "Products/count"))
            .await
        {
            Ok(value) => parse_count(&value).unwrap_or_else(|| {
                warn!(body = %value, "Unexpected products count payload");
                0
            }),
            Err(e) => {
                warn!(error = %e, "Returning zero product count");
                0
            }
        }
    }

    // =========================================================================
    // Writes (fail-loud)
    // =========================================================================

    /// Create a product.
    ///
    /// Returns the created product when the API echoes one back.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Option<Product>, ApiError> {
        let value = self
            .execute_json(self.request(Method::POST, "Products").json(draft))
            .await?;
        Ok(decode_one(value, "created product"))
    }

    /// Replace a product.
    ///
    /// Returns the updated product when the API echoes one back (many
    /// deployments answer `204 No Content`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, ApiError> {
        let value = self
            .execute_json(self.request(Method::PUT, &format!("Products/{id}")).json(draft))
            .await?;
        Ok(decode_one(value, "updated product"))
    }

    /// Delete a product. `true` on a 2xx response.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> bool {
        self.execute(self.request(Method::DELETE, &format!("Products/{id}")))
            .await
            .inspect_err(|e| warn!(error = %e, "Delete failed"))
            .is_ok()
    }

    /// Flip a product's active flag. `true` on a 2xx response.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn toggle_product_status(&self, id: ProductId) -> bool {
        self.execute(self.request(Method::PATCH, &format!("Products/{id}/toggle-status")))
            .await
            .inspect_err(|e| warn!(error = %e, "Toggle status failed"))
            .is_ok()
    }
}

/// Decode a JSON array element by element, skipping the ones that fail.
fn decode_list<T: DeserializeOwned>(value: Value, what: &str) -> Vec<T> {
    let Value::Array(elements) = value else {
        if !value.is_null() {
            warn!(kind = what, "Expected a JSON array");
        }
        return Vec::new();
    };

    elements
        .into_iter()
        .filter_map(|element| {
            serde_json::from_value(element)
                .inspect_err(|e| warn!(kind = what, error = %e, "Skipping malformed element"))
                .ok()
        })
        .collect()
}

fn decode_one<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    if value.is_null() {
        return None;
    }
    serde_json::from_value(value)
        .inspect_err(|e| warn!(kind = what, error = %e, "Response did not decode"))
        .ok()
}

fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map
            .get("count")
            .or_else(|| map.get("total"))
            .and_then(parse_count),
        _ => None,
    }
}
