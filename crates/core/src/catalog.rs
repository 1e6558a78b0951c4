//! Listing filters, inventory statistics and bulk-upload drafts.

use crate::product::{Category, Product, ProductDraft};
use crate::types::Price;

/// Category filter value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

/// Search and category filter applied to a fetched product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product or category name.
    pub search: String,
    /// Category name, or [`ALL_CATEGORIES`] / empty for every category.
    pub category: String,
}

impl ProductFilter {
    /// Build a filter from optional query parameters.
    #[must_use]
    pub fn new(search: Option<&str>, category: Option<&str>) -> Self {
        Self {
            search: search.unwrap_or_default().trim().to_string(),
            category: category.unwrap_or_default().trim().to_string(),
        }
    }

    /// Whether a product passes both the search and the category filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product) && self.matches_category(product)
    }

    /// Keep only matching products, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }

    fn matches_search(&self, product: &Product) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        product.name.to_lowercase().contains(&needle)
            || product
                .category_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
    }

    fn matches_category(&self, product: &Product) -> bool {
        if self.category.is_empty() || self.category == ALL_CATEGORIES {
            return true;
        }
        product.category_name.as_deref() == Some(self.category.as_str())
    }
}

/// Headline numbers for the management dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InventoryStats {
    pub total_products: usize,
    pub active_products: usize,
    pub out_of_stock: usize,
    /// Σ price × stock quantity.
    pub inventory_value: Price,
}

impl InventoryStats {
    /// Compute stats over a product list.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            total_products: products.len(),
            active_products: products.iter().filter(|p| p.is_active).count(),
            out_of_stock: products.iter().filter(|p| p.is_out_of_stock()).count(),
            inventory_value: products.iter().map(Product::inventory_value).sum(),
        }
    }
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Whether there is a page before this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether there is a page after this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into pages of `per_page` and return the requested one.
///
/// Out-of-range page numbers are clamped. An empty list is one empty page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        total_pages,
    }
}

/// Defaults applied to every product created by a bulk image upload.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDefaults {
    pub price: Price,
    pub original_price: Option<Price>,
    pub stock_quantity: i32,
    pub brand: String,
    pub badge: Option<String>,
    /// SKU prefix; the final SKU is `<prefix>-<batch>-<index>`.
    pub sku_prefix: String,
}

impl Default for BulkDefaults {
    fn default() -> Self {
        Self {
            price: Price::from_cents(9900),
            original_price: None,
            stock_quantity: 10,
            brand: "Luxe".to_string(),
            badge: Some("New".to_string()),
            sku_prefix: "LUX".to_string(),
        }
    }
}

/// Turn an image file name into a product name.
///
/// `summer-tote_bag.jpg` becomes `summer tote bag`.
#[must_use]
pub fn name_from_file_name(file_name: &str) -> String {
    let stem = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = match stem.rfind('.') {
        Some(dot) if dot > 0 => stem.get(..dot).unwrap_or(stem),
        _ => stem,
    };
    stem.replace(['-', '_'], " ").trim().to_string()
}

/// Build a draft for one file of a bulk upload.
///
/// `batch` distinguishes uploads (a timestamp in practice) and `index` the
/// file within the upload, so SKUs stay unique.
#[must_use]
pub fn bulk_draft(
    file_name: &str,
    image_data_url: String,
    category: Option<&Category>,
    defaults: &BulkDefaults,
    batch: i64,
    index: usize,
) -> ProductDraft {
    let name = name_from_file_name(file_name);
    ProductDraft {
        description: format!("Premium {name} product"),
        price: defaults.price,
        original_price: defaults.original_price,
        sku: format!("{}-{batch}-{index}", defaults.sku_prefix),
        stock_quantity: defaults.stock_quantity,
        brand: Some(defaults.brand.clone()),
        badge: defaults.badge.clone(),
        in_stock: defaults.stock_quantity > 0,
        category_id: category.map(|c| c.id),
        images: vec![image_data_url],
        name,
        ..ProductDraft::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{CategoryId, ProductId};
    use serde_json::json;

    fn product(name: &str, category: &str, cents: i64, stock: i32, active: bool) -> Product {
        let mut product: Product = serde_json::from_value(json!({
            "id": ProductId::new(uuid::Uuid::new_v4()),
            "name": name,
            "price": 0,
            "categoryName": category,
            "stockQuantity": stock,
            "isActive": active,
        }))
        .unwrap();
        product.price = Price::from_cents(cents);
        product
    }

    #[test]
    fn test_filter_search_matches_name_or_category() {
        let products = vec![
            product("Leather Tote", "Bags", 100, 1, true),
            product("Silk Scarf", "Accessories", 100, 1, true),
        ];

        let by_name = ProductFilter::new(Some("TOTE"), None);
        assert_eq!(by_name.apply(&products).len(), 1);

        let by_category = ProductFilter::new(Some("access"), Some("all"));
        let matched = by_category.apply(&products);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "Silk Scarf");
    }

    #[test]
    fn test_filter_category_exact() {
        let products = vec![
            product("Leather Tote", "Bags", 100, 1, true),
            product("Canvas Bag", "Bags", 100, 1, true),
            product("Silk Scarf", "Accessories", 100, 1, true),
        ];

        let filter = ProductFilter::new(None, Some("Bags"));
        assert_eq!(filter.apply(&products).len(), 2);
        assert_eq!(ProductFilter::default().apply(&products).len(), 3);
    }

    #[test]
    fn test_inventory_stats() {
        let products = vec![
            product("A", "Bags", 1000, 3, true),
            product("B", "Bags", 250, 0, false),
            product("C", "Bags", 100, 10, true),
        ];
        let stats = InventoryStats::from_products(&products);
        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.active_products, 2);
        assert_eq!(stats.out_of_stock, 1);
        assert_eq!(stats.inventory_value, Price::from_cents(4000));
    }

    #[test]
    fn test_paginate_clamps() {
        let page = paginate((1..=25).collect::<Vec<_>>(), 3, 12);
        assert_eq!(page.items, vec![25]);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(!page.has_next());

        let clamped = paginate((1..=5).collect::<Vec<_>>(), 9, 12);
        assert_eq!(clamped.page, 1);

        let empty = paginate(Vec::<u8>::new(), 0, 12);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_name_from_file_name() {
        assert_eq!(name_from_file_name("summer-tote_bag.jpg"), "summer tote bag");
        assert_eq!(name_from_file_name("photos/gold-ring.final.png"), "gold ring.final");
        assert_eq!(name_from_file_name(".hidden"), ".hidden");
        assert_eq!(name_from_file_name("noext"), "noext");
    }

    #[test]
    fn test_bulk_draft() {
        let category = Category {
            id: CategoryId::new(uuid::Uuid::from_u128(5)),
            name: "Jewelry".to_string(),
            description: None,
        };
        let draft = bulk_draft(
            "gold-ring.jpg",
            "data:image/jpeg;base64,/9j/".to_string(),
            Some(&category),
            &BulkDefaults::default(),
            1_700_000_000_000,
            2,
        );
        assert_eq!(draft.name, "gold ring");
        assert_eq!(draft.description, "Premium gold ring product");
        assert_eq!(draft.sku, "LUX-1700000000000-2");
        assert_eq!(draft.category_id, Some(category.id));
        assert!(draft.validate().is_ok());
    }
}
