//! The shopping cart store.
//!
//! A [`CartStore`] is the single source of truth for one visitor's cart. It is
//! an ordinary value: handlers load it, pass it by reference to whatever needs
//! to read or change it, and hand it back to the session when they are done.
//! There is no global cart.
//!
//! ## Invariants
//! - Items are unique by product id (adding an existing product bumps its quantity)
//! - Every item present has quantity >= 1 (setting quantity to 0 removes it)
//! - Items keep insertion order for display
//! - `total_items` and `total_price` always reflect the current items
//!
//! ## Operations
//! ```text
//! add_to_cart(product)        -> existing: quantity += 1, new: push with quantity 1
//! update_quantity(id, n)      -> n <= 0: remove, otherwise quantity = n
//! remove_from_cart(id)        -> remove if present
//! clear_cart()                -> remove everything
//! set_cart_open(bool)         -> drawer visibility, not cart data
//! ```
//!
//! Every operation is total: unknown ids are no-ops and nothing returns an error.

use serde::{Deserialize, Serialize};

use crate::images::ImageSource;
use crate::product::Product;
use crate::types::{Price, ProductId};

/// Anything that can be put in the cart.
pub trait CartProduct {
    /// Uniqueness key for the line item.
    fn cart_id(&self) -> ProductId;
    /// Display name frozen into the line item.
    fn cart_name(&self) -> &str;
    /// Unit price frozen into the line item.
    fn cart_price(&self) -> Price;
    /// Image source frozen into the line item.
    fn cart_image(&self) -> ImageSource;
}

impl CartProduct for Product {
    fn cart_id(&self) -> ProductId {
        self.id
    }

    fn cart_name(&self) -> &str {
        &self.name
    }

    fn cart_price(&self) -> Price {
        self.price
    }

    fn cart_image(&self) -> ImageSource {
        self.image()
    }
}

/// How a line item refers to its product's image.
///
/// Linked images keep their URL. Embedded `data:` images are not copied into
/// the line; pages fetch them by product id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartImage {
    Linked(String),
    Embedded,
    #[default]
    None,
}

impl From<ImageSource> for CartImage {
    fn from(source: ImageSource) -> Self {
        match source {
            ImageSource::Url(url) if url.starts_with("data:") => Self::Embedded,
            ImageSource::Url(url) => Self::Linked(url),
            ImageSource::Placeholder => Self::None,
        }
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: CartImage,
    pub quantity: u32,
}

impl CartItem {
    /// Price of this line (unit price × quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// The cart for one browsing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartStore {
    items: Vec<CartItem>,
    #[serde(default)]
    is_cart_open: bool,
}

impl CartStore {
    /// Create an empty, closed cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product.
    ///
    /// If the product is already in the cart its quantity goes up by exactly
    /// one; otherwise it is appended with quantity 1. Stock is not checked.
    pub fn add_to_cart(&mut self, product: &impl CartProduct) {
        let id = product.cart_id();
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem {
            id,
            name: product.cart_name().to_string(),
            price: product.cart_price(),
            image: product.cart_image().into(),
            quantity: 1,
        });
    }

    /// Set an item's quantity, removing it when `quantity <= 0`.
    ///
    /// No upper bound is enforced. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Remove an item if present.
    pub fn remove_from_cart(&mut self, id: ProductId) {
        self.items.retain(|item| item.id != id);
    }

    /// Empty the cart. The drawer flag is left alone.
    pub fn clear_cart(&mut self) {
        self.items.clear();
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a single item.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all items.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price × quantity` across all items.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Whether the cart drawer is showing.
    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.is_cart_open
    }

    /// Show or hide the cart drawer.
    pub const fn set_cart_open(&mut self, open: bool) {
        self.is_cart_open = open;
    }
}
