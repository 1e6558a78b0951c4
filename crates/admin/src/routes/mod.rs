//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Health check
//! GET  /                              - Redirect to /products
//!
//! # Products
//! GET  /products                      - Management page (?search= &category= &page=)
//! POST /products                      - Create product (multipart)
//! GET  /products/new                  - Entry form
//! POST /products/bulk                 - Bulk image upload (multipart, one product per image)
//! GET  /products/{id}/edit            - Edit form
//! POST /products/{id}                 - Update product (multipart)
//! POST /products/{id}/delete          - Delete product
//! POST /products/{id}/toggle-status   - Toggle active flag
//! ```
//!
//! Mutations redirect back to the management page with a `?notice=` so the
//! outcome is shown once and a refresh does not resubmit.

pub mod bulk;
pub mod entry;
pub mod products;

use askama::Template;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::{Html, Redirect},
    routing::{get, post},
};
use luxe_core::{Category, CategoryId};

use crate::error::Result;
use crate::state::AppState;

/// Body limit for the entry and edit forms: five images plus re-posted ones.
pub const FORM_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Body limit for bulk uploads.
pub const BULK_BODY_LIMIT: usize = 256 * 1024 * 1024;

/// A category entry in a filter or form select.
#[derive(Clone, Debug)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

impl CategoryOption {
    /// Options for a select keyed by category id.
    pub fn by_id(categories: &[Category], selected: Option<CategoryId>) -> Vec<Self> {
        categories
            .iter()
            .map(|c| Self {
                id: c.id.to_string(),
                name: c.name.clone(),
                selected: Some(c.id) == selected,
            })
            .collect()
    }

    /// Options for a filter keyed by category name.
    pub fn by_name(categories: &[Category], selected: &str) -> Vec<Self> {
        categories
            .iter()
            .map(|c| Self {
                id: c.id.to_string(),
                name: c.name.clone(),
                selected: c.name == selected,
            })
            .collect()
    }
}

/// Render a template to HTML.
pub(crate) fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::index)
                .post(entry::create)
                .layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route("/new", get(entry::new))
        .route(
            "/bulk",
            post(bulk::upload).layer(DefaultBodyLimit::max(BULK_BODY_LIMIT)),
        )
        .route(
            "/{id}",
            post(entry::update).layer(DefaultBodyLimit::max(FORM_BODY_LIMIT)),
        )
        .route("/{id}/edit", get(entry::edit))
        .route("/{id}/delete", post(products::delete))
        .route("/{id}/toggle-status", post(products::toggle_status))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .nest("/products", product_routes())
}
