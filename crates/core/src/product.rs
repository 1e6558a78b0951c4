//! Catalog entities as the products API returns and accepts them.
//!
//! The catalog is owned by the external API. These types are read-only
//! snapshots fetched per request; nothing here is cached or persisted.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};

use crate::images::{ImageSource, ProductGallery};
use crate::types::{CategoryId, Price, ProductId};

/// A product as returned by `GET /Products` and `GET /Products/{id}`.
///
/// Only `id`, `name` and `price` are required; every other field falls back
/// to its default so a sparse record still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    /// Classified once here; consumers call [`Product::image`].
    #[serde(default)]
    pub images: ProductGallery,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, alias = "reviews", deserialize_with = "null_as_default")]
    pub review_count: u32,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stock_quantity: i32,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub in_stock: bool,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(|flag| flag.unwrap_or(true))
}

impl Product {
    /// The renderable image for this product.
    #[must_use]
    pub fn image(&self) -> ImageSource {
        self.images.source()
    }

    /// Percentage off the original price, rounded to the nearest whole number.
    ///
    /// Zero when there is no original price or it is not above the current one.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        let Some(original) = self.original_price else {
            return 0;
        };
        let original = original.amount();
        let price = self.price.amount();
        if original <= price || original <= Decimal::ZERO {
            return 0;
        }
        ((original - price) / original * Decimal::ONE_HUNDRED)
            .round()
            .to_u32()
            .unwrap_or(0)
    }

    /// Whether the product should be shown as unavailable.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        !self.in_stock || self.stock_quantity == 0
    }

    /// Value of the stock on hand at the current price.
    #[must_use]
    pub fn inventory_value(&self) -> Price {
        let units = u32::try_from(self.stock_quantity).unwrap_or(0);
        self.price.times(units)
    }

    /// The category label to show, if the API sent one.
    #[must_use]
    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or("")
    }
}

/// A product category from `GET /Categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The body of `POST /Products` and `PUT /Products/{id}`.
///
/// Optional fields serialize as explicit `null`, which is what the API
/// expects for "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub original_price: Option<Price>,
    pub sku: String,
    pub stock_quantity: i32,
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub brand: Option<String>,
    pub is_featured: bool,
    pub in_stock: bool,
    pub rating: f64,
    pub review_count: u32,
    pub badge: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Data URLs produced from uploaded files.
    pub images: Vec<String>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: Price::ZERO,
            original_price: None,
            sku: String::new(),
            stock_quantity: 0,
            color: None,
            size: None,
            material: None,
            brand: None,
            is_featured: false,
            in_stock: true,
            rating: 0.0,
            review_count: 0,
            badge: None,
            category_id: None,
            images: Vec::new(),
        }
    }
}

impl ProductDraft {
    /// Pre-fill a draft from an existing product, for the edit form.
    ///
    /// Every image that stands on its own is carried over, so saving the
    /// form does not drop any. A split pair is joined into one data URL.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            original_price: product.original_price,
            sku: product.sku.clone().unwrap_or_default(),
            stock_quantity: product.stock_quantity,
            color: product.color.clone(),
            size: product.size.clone(),
            material: product.material.clone(),
            brand: product.brand.clone(),
            is_featured: product.is_featured,
            in_stock: product.in_stock,
            rating: product.rating,
            review_count: product.review_count,
            badge: product.badge.clone(),
            category_id: product.category_id,
            images: product.images.all_sources(),
        }
    }

    /// Turn blank optional strings into `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }

        self.name = self.name.trim().to_string();
        self.description = self.description.trim().to_string();
        self.sku = self.sku.trim().to_string();
        self.color = blank_to_none(self.color);
        self.size = blank_to_none(self.size);
        self.material = blank_to_none(self.material);
        self.brand = blank_to_none(self.brand);
        self.badge = blank_to_none(self.badge);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "id": "0b6c53c4-9d0c-4a39-8f4e-2a8e2c1f7a11",
            "name": "Leather Tote",
            "description": "Hand-stitched full grain leather",
            "price": 240.0,
            "originalPrice": 300,
            "images": ["data:image/jpeg", "base64,AAAA"],
            "categoryId": "7a1d4c35-0c44-4b5c-8d2a-3f1e7e0a9b22",
            "categoryName": "Bags",
            "rating": 4.6,
            "reviewCount": 18,
            "stockQuantity": 4,
            "inStock": true,
            "isActive": true,
            "isFeatured": true
        })
    }

    #[test]
    fn test_deserialize_full_product() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.name, "Leather Tote");
        assert_eq!(product.price, Price::from_cents(24000));
        assert_eq!(product.review_count, 18);
        assert_eq!(
            product.image(),
            ImageSource::Url("data:image/jpeg;base64,AAAA".to_string())
        );
    }

    #[test]
    fn test_deserialize_sparse_product() {
        let product: Product = serde_json::from_value(json!({
            "id": "0b6c53c4-9d0c-4a39-8f4e-2a8e2c1f7a11",
            "name": "Scarf",
            "price": "35.5",
            "images": null
        }))
        .unwrap();
        assert!(product.in_stock);
        assert!(product.is_active);
        assert_eq!(product.image(), ImageSource::Placeholder);
        assert!(product.is_out_of_stock());
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let product: Product = serde_json::from_value(json!({
            "id": "0b6c53c4-9d0c-4a39-8f4e-2a8e2c1f7a11",
            "name": "Scarf",
            "price": 35,
            "description": null,
            "rating": null,
            "reviewCount": null,
            "stockQuantity": null,
            "inStock": null,
            "isActive": null,
            "isFeatured": null,
            "sku": null
        }))
        .unwrap();
        assert_eq!(product.description, "");
        assert!(product.rating.abs() < f64::EPSILON);
        assert_eq!(product.review_count, 0);
        assert_eq!(product.stock_quantity, 0);
        assert!(product.in_stock);
        assert!(product.is_active);
        assert!(!product.is_featured);
    }

    #[test]
    fn test_ids_must_be_guids() {
        let result = serde_json::from_value::<Product>(json!({
            "id": "sku-42",
            "name": "Scarf",
            "price": 35
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_draft_from_product_keeps_every_image() {
        let mut value = product_json();
        value["images"] = json!(["https://cdn/a.jpg", "https://cdn/b.jpg", "https://cdn/c.jpg"]);
        let product: Product = serde_json::from_value(value).unwrap();

        let draft = ProductDraft::from_product(&product);
        assert_eq!(
            draft.images,
            vec!["https://cdn/a.jpg", "https://cdn/b.jpg", "https://cdn/c.jpg"]
        );

        let split: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(
            ProductDraft::from_product(&split).images,
            vec!["data:image/jpeg;base64,AAAA"]
        );
    }

    #[test]
    fn test_discount_percent() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.discount_percent(), 20);

        let no_discount = Product {
            original_price: Some(Price::from_cents(10000)),
            price: Price::from_cents(12000),
            ..product.clone()
        };
        assert_eq!(no_discount.discount_percent(), 0);

        let none = Product {
            original_price: None,
            ..product
        };
        assert_eq!(none.discount_percent(), 0);
    }

    #[test]
    fn test_inventory_value() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.inventory_value(), Price::from_cents(96000));
    }

    #[test]
    fn test_draft_serializes_nulls_camel_case() {
        let draft = ProductDraft {
            name: "Silk Scarf".to_string(),
            price: Price::from_cents(4500),
            ..ProductDraft::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["originalPrice"], serde_json::Value::Null);
        assert_eq!(value["stockQuantity"], json!(0));
        assert_eq!(value["price"], json!(45.0));
        assert_eq!(value["inStock"], json!(true));
    }

    #[test]
    fn test_draft_normalized_blanks() {
        let draft = ProductDraft {
            name: "  Wool Coat ".to_string(),
            color: Some("   ".to_string()),
            brand: Some(" Luxe ".to_string()),
            ..ProductDraft::default()
        }
        .normalized();
        assert_eq!(draft.name, "Wool Coat");
        assert_eq!(draft.color, None);
        assert_eq!(draft.brand.as_deref(), Some("Luxe"));
    }
}
