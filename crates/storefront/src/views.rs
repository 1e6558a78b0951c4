//! Display data handed to templates.
//!
//! Views are plain owned structs with every value pre-formatted, so templates
//! never touch domain types directly.

use luxe_core::{CartImage, CartItem, CartStore, ImageSource, Product};

/// An image slot: a source URL, or the placeholder when there is none.
///
/// Templates render the placeholder both when `src` is `None` and when the
/// browser fails to load `src`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageView {
    pub src: Option<String>,
    pub alt: String,
}

impl ImageView {
    #[must_use]
    pub fn new(source: ImageSource, alt: &str) -> Self {
        Self {
            src: source.url().map(String::from),
            alt: alt.to_string(),
        }
    }

    /// Text shown inside the placeholder: the alt text, or a generic label.
    #[must_use]
    pub fn label(&self) -> &str {
        let alt = self.alt.trim();
        if alt.is_empty() { "No Image" } else { alt }
    }
}

/// A product tile in a grid.
#[derive(Clone, Debug)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: u32,
    pub badge: Option<String>,
    pub rating: f64,
    pub review_count: u32,
    pub out_of_stock: bool,
    pub image: ImageView,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category_label().to_string(),
            price: product.price.to_string(),
            original_price: product
                .original_price
                .filter(|original| *original > product.price)
                .map(|original| original.to_string()),
            discount_percent: product.discount_percent(),
            badge: product.badge.clone(),
            rating: product.rating,
            review_count: product.review_count,
            out_of_stock: product.is_out_of_stock(),
            image: ImageView::new(product.image(), &product.name),
        }
    }
}

/// The product detail page.
#[derive(Clone, Debug)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub sku: Option<String>,
    pub stock_quantity: i32,
    /// Label/value pairs for the attributes that are set.
    pub attributes: Vec<(&'static str, String)>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let attributes = [
            ("Brand", &product.brand),
            ("Material", &product.material),
            ("Color", &product.color),
            ("Size", &product.size),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v.to_string()))
        })
        .collect();

        Self {
            card: ProductCardView::from(product),
            description: product.description.clone(),
            sku: product.sku.clone(),
            stock_quantity: product.stock_quantity,
            attributes,
        }
    }
}

/// One line in the cart drawer.
#[derive(Clone, Debug)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    /// Quantity after one "minus" click; zero removes the line.
    pub quantity_down: u32,
    pub quantity_up: u32,
    pub price: String,
    pub line_price: String,
    pub image: ImageView,
}

/// Where a cart line's image is loaded from.
fn line_image(item: &CartItem) -> ImageSource {
    match &item.image {
        CartImage::Linked(url) => ImageSource::Url(url.clone()),
        CartImage::Embedded => ImageSource::Url(format!("/products/{}/image", item.id)),
        CartImage::None => ImageSource::Placeholder,
    }
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            quantity_down: item.quantity.saturating_sub(1),
            quantity_up: item.quantity.saturating_add(1),
            price: item.price.to_string(),
            line_price: item.line_total().to_string(),
            image: ImageView::new(line_image(item), &item.name),
        }
    }
}

/// The cart drawer and cart page.
#[derive(Clone, Debug)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
    pub is_open: bool,
}

impl CartView {
    /// Create an empty, closed cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartStore::new())
    }
}

impl From<&CartStore> for CartView {
    fn from(cart: &CartStore) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().to_string(),
            item_count: cart.total_items(),
            is_open: cart.is_cart_open(),
        }
    }
}
