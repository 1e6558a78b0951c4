//! Session middleware configuration and cart persistence.
//!
//! Sessions live in a bounded in-process moka cache that evicts expired
//! entries. Each one carries the visitor's [`CartStore`] under a single key;
//! handlers load it, change it and store it back within the same request.

use luxe_core::CartStore;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_moka_store::MokaStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "luxe_session";

/// Session key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Most sessions kept at once; the least recently used are evicted first.
pub const MAX_SESSIONS: u64 = 50_000;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaStore> {
    SessionManagerLayer::new(MokaStore::new(Some(MAX_SESSIONS)))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Load the cart for this session, or an empty one.
///
/// A cart that fails to deserialize is logged and replaced with an empty one.
pub async fn load_cart(session: &Session) -> CartStore {
    match session.get::<CartStore>(CART_KEY).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            CartStore::new()
        }
    }
}

/// Store the cart back into the session.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_cart(
    session: &Session,
    cart: &CartStore,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(CART_KEY, cart).await
}
