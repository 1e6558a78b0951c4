//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself is a [`CartStore`] kept in the visitor's session: each
//! handler loads it, applies one operation and stores it back.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use luxe_core::{CartStore, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{load_cart, save_cart};
use crate::routes::products::fetch_product;
use crate::state::AppState;
use crate::views::CartView;

/// HTMX event fired after any change to the cart contents.
const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Update cart form data.
///
/// Quantity is signed: zero or less removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart drawer fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_drawer.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id '{raw}'")))
}

/// Load the cart, apply `change`, and store it back.
async fn modify_cart(session: &Session, change: impl FnOnce(&mut CartStore)) -> Result<CartStore> {
    let mut cart = load_cart(session).await;
    change(&mut cart);
    save_cart(session, &cart).await?;
    Ok(cart)
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    CartShowTemplate {
        cart: CartView::from(&load_cart(&session).await),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// The product is fetched from the API so the line item carries its current
/// name, price and image. Returns the count badge and fires `cart-updated`.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<impl IntoResponse> {
    let product = fetch_product(&state, &form.product_id).await?;
    let cart = modify_cart(&session, |cart| cart.add_to_cart(&product)).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", form.product_id.as_str())]),
    );

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    ))
}

/// Set a line's quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<impl IntoResponse> {
    let id = parse_id(&form.product_id)?;
    let cart = modify_cart(&session, |cart| cart.update_quantity(id, form.quantity)).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    ))
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&form.product_id)?;
    let cart = modify_cart(&session, |cart| cart.remove_from_cart(id)).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    ))
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<impl IntoResponse> {
    let cart = modify_cart(&session, CartStore::clear_cart).await?;

    Ok((
        AppendHeaders([CART_UPDATED]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    ))
}

/// Show the cart drawer (HTMX).
#[instrument(skip(session))]
pub async fn open(session: Session) -> Result<impl IntoResponse> {
    let cart = modify_cart(&session, |cart| cart.set_cart_open(true)).await?;
    Ok(CartDrawerTemplate {
        cart: CartView::from(&cart),
    })
}

/// Hide the cart drawer (HTMX).
#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<impl IntoResponse> {
    let cart = modify_cart(&session, |cart| cart.set_cart_open(false)).await?;
    Ok(CartDrawerTemplate {
        cart: CartView::from(&cart),
    })
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.total_items(),
    }
}
