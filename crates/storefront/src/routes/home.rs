//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use luxe_client::ProductQuery;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::middleware::load_cart;
use crate::state::AppState;
use crate::views::{CartView, ProductCardView};

/// Number of featured products on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub cart: CartView,
    pub featured: Vec<ProductCardView>,
}

/// Display the home page.
///
/// An unreachable API renders the page with an empty featured grid.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let featured = state
        .api()
        .get_all_products(&ProductQuery::featured(FEATURED_COUNT))
        .await
        .iter()
        .filter(|p| p.is_active)
        .map(ProductCardView::from)
        .collect();

    HomeTemplate {
        cart: CartView::from(&load_cart(&session).await),
        featured,
    }
}
