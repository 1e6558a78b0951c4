//! Client for the Luxe products REST API.
//!
//! # Architecture
//!
//! - The external API is the source of truth for products and categories.
//!   Nothing is cached; every call goes over the wire.
//! - Read paths are fail-soft: transport errors, non-2xx responses and
//!   undecodable bodies are logged and turned into an empty result.
//! - Write paths are fail-loud: create and update return [`ApiError`] so the
//!   initiating form can show the failure; delete and toggle report a `bool`.
//! - No retries, no request de-duplication.
//!
//! # Endpoints
//!
//! ```text
//! GET    /Products                     get_all_products
//! GET    /Products/{id}                get_product_by_id
//! GET    /Products/count               get_products_count
//! POST   /Products                     create_product
//! PUT    /Products/{id}                update_product
//! DELETE /Products/{id}                delete_product
//! PATCH  /Products/{id}/toggle-status  toggle_product_status
//! GET    /Categories                   get_categories
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use luxe_client::{ApiConfig, ProductApi, ProductQuery};
//!
//! let api = ProductApi::new(&ApiConfig::from_env()?)?;
//! let featured = api.get_all_products(&ProductQuery::featured(8)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
pub mod config;

pub use client::{ProductApi, ProductQuery};
pub use config::{ApiConfig, ConfigError, Environment};

use thiserror::Error;

/// Longest slice of a response body kept in errors and logs.
const MAX_BODY_CHARS: usize = 500;

/// Errors that can occur when talking to the products API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, timeout, TLS failure).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The HTTP status, when the API answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A message fit for showing to an admin user.
    ///
    /// Prefers the server's own explanation (`message`, `title` or `detail`
    /// from a JSON problem body, or the raw text), falling back to a generic
    /// description of what went wrong.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, body } => server_message(body)
                .unwrap_or_else(|| format!("The products API rejected the request ({status})")),
            Self::Transport(e) if e.is_timeout() => {
                "The products API did not respond in time".to_string()
            }
            Self::Transport(_) => "Could not reach the products API".to_string(),
            Self::Decode(_) => "The products API sent an unexpected response".to_string(),
        }
    }
}

fn server_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(s)) => Some(s),
        Ok(value) => ["message", "title", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
            .map(String::from),
        Err(_) => Some(truncate(body)),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(code: u16, body: &str) -> ApiError {
        ApiError::Status {
            status: reqwest::StatusCode::from_u16(code).unwrap_or_default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_error_display() {
        let err = status_error(500, "boom");
        assert_eq!(err.to_string(), "API returned 500 Internal Server Error: boom");
        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_user_message_prefers_problem_title() {
        let err = status_error(
            400,
            r#"{"type":"https://tools.ietf.org/html/rfc7231","title":"One or more validation errors occurred.","status":400}"#,
        );
        assert_eq!(err.user_message(), "One or more validation errors occurred.");
    }

    #[test]
    fn test_user_message_plain_text_body() {
        let err = status_error(409, "SKU already exists");
        assert_eq!(err.user_message(), "SKU already exists");

        let err = status_error(409, "\"SKU already exists\"");
        assert_eq!(err.user_message(), "SKU already exists");
    }

    #[test]
    fn test_user_message_empty_body() {
        let err = status_error(502, "  ");
        assert_eq!(
            err.user_message(),
            "The products API rejected the request (502 Bad Gateway)"
        );
    }

    #[test]
    fn test_truncate_long_bodies() {
        let long = "x".repeat(MAX_BODY_CHARS * 2);
        assert_eq!(truncate(&long).len(), MAX_BODY_CHARS);
    }
}
