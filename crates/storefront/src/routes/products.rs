//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use luxe_client::ProductQuery;
use luxe_core::catalog::{ALL_CATEGORIES, ProductFilter};
use luxe_core::{ImageSource, Product, ProductId, decode_data_url};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::load_cart;
use crate::state::AppState;
use crate::views::{CartView, ProductCardView, ProductDetailView};

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// A category entry in the listing filter.
#[derive(Clone, Debug)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub cart: CartView,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryOption>,
    pub search: String,
    pub all_selected: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub cart: CartView,
    pub product: ProductDetailView,
}

/// Quick view fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_view.html")]
pub struct QuickViewTemplate {
    pub product: ProductDetailView,
}

/// Display product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let filter = ProductFilter::new(query.search.as_deref(), query.category.as_deref());

    let all = ProductQuery::all();
    let (products, categories) = tokio::join!(
        state.api().get_all_products(&all),
        state.api().get_categories(),
    );

    let products = filter
        .apply(&products)
        .into_iter()
        .filter(|p| p.is_active)
        .map(ProductCardView::from)
        .collect();

    let all_selected = filter.category.is_empty() || filter.category == ALL_CATEGORIES;
    let categories = categories
        .into_iter()
        .map(|c| CategoryOption {
            selected: c.name == filter.category,
            name: c.name,
        })
        .collect();

    ProductsIndexTemplate {
        cart: CartView::from(&load_cart(&session).await),
        products,
        categories,
        search: filter.search,
        all_selected,
    }
}

/// Display product detail page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = fetch_product(&state, &id).await?;

    Ok(ProductShowTemplate {
        cart: CartView::from(&load_cart(&session).await),
        product: ProductDetailView::from(&product),
    })
}

/// Display quick view fragment (for HTMX).
#[instrument(skip(state))]
pub async fn quick_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = fetch_product(&state, &id).await?;

    Ok(QuickViewTemplate {
        product: ProductDetailView::from(&product),
    })
}

/// Serve a product's image by id.
///
/// Embedded images are decoded and sent with their own MIME type; linked
/// ones redirect to their URL.
#[instrument(skip(state))]
pub async fn image(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let product = fetch_product(&state, &id).await?;

    let ImageSource::Url(url) = product.image() else {
        return Err(AppError::NotFound(format!("image for product {id}")));
    };
    Ok(match decode_data_url(&url) {
        Some((mime, bytes)) => (
            [
                (header::CONTENT_TYPE, mime),
                (header::CACHE_CONTROL, "public, max-age=300".to_string()),
            ],
            bytes,
        )
            .into_response(),
        None => Redirect::temporary(&url).into_response(),
    })
}

/// Parse a product id from the path and fetch the product.
///
/// Inactive products are treated as missing.
pub(crate) async fn fetch_product(state: &AppState, raw_id: &str) -> Result<Product> {
    let id: ProductId = raw_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id '{raw_id}'")))?;

    state
        .api()
        .get_product_by_id(id)
        .await
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
