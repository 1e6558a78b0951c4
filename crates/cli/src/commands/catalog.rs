//! Catalog inspection and row-level product commands.
//!
//! # Usage
//!
//! ```bash
//! luxe-cli products list --featured
//! luxe-cli products count
//! luxe-cli products delete 6f9619ff-8b86-d011-b42d-00c04fc964ff
//! luxe-cli categories
//! ```

use luxe_client::{ProductApi, ProductQuery};
use luxe_core::catalog::{InventoryStats, ProductFilter};
use luxe_core::{Product, ProductId};

use super::CommandError;

fn parse_id(raw: &str) -> Result<ProductId, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::InvalidId(raw.to_owned()))
}

/// One-line summary of a product.
fn summary_line(product: &Product) -> String {
    let status = if product.is_active { "active" } else { "inactive" };
    format!(
        "{}  {:<32}  {:>10}  stock {:>4}  {:<8}  {}",
        product.id,
        product.name,
        product.price.to_string(),
        product.stock_quantity,
        status,
        product.category_label(),
    )
}

/// List products matching a search, optionally featured only.
pub async fn list(api: &ProductApi, search: Option<String>, featured: bool) {
    let products = api.get_all_products(&ProductQuery::all()).await;
    let filter = ProductFilter::new(search.as_deref(), None);

    let matching: Vec<&Product> = filter
        .apply(&products)
        .into_iter()
        .filter(|p| !featured || p.is_featured)
        .collect();

    for product in &matching {
        tracing::info!("{}", summary_line(product));
    }

    let stats = InventoryStats::from_products(&products);
    tracing::info!(
        "{} shown of {} ({} active, {} out of stock, inventory value {})",
        matching.len(),
        stats.total_products,
        stats.active_products,
        stats.out_of_stock,
        stats.inventory_value,
    );
}

/// Print the product count reported by the API.
pub async fn count(api: &ProductApi) {
    tracing::info!("{} products", api.get_products_count().await);
}

/// Print one product in full.
///
/// # Errors
///
/// Returns an error if the id is invalid or the product does not exist.
pub async fn show(api: &ProductApi, raw_id: &str) -> Result<(), CommandError> {
    let id = parse_id(raw_id)?;
    let product = api
        .get_product_by_id(id)
        .await
        .ok_or_else(|| CommandError::NotFound(id.to_string()))?;

    tracing::info!("{}", summary_line(&product));
    tracing::info!("  Description: {}", product.description);
    if let Some(sku) = &product.sku {
        tracing::info!("  SKU: {sku}");
    }
    if let Some(original) = product.original_price {
        tracing::info!(
            "  Original price: {original} ({}% off)",
            product.discount_percent()
        );
    }
    tracing::info!(
        "  Rating: {:.1} ({} reviews)",
        product.rating,
        product.review_count
    );
    tracing::info!("  Featured: {}", product.is_featured);
    tracing::info!(
        "  Image: {}",
        product.image().url().map_or("(placeholder)", |url| {
            if url.starts_with("data:") { "(embedded data URL)" } else { url }
        })
    );
    Ok(())
}

/// Delete one product.
///
/// # Errors
///
/// Returns an error if the id is invalid or the API refuses.
pub async fn delete(api: &ProductApi, raw_id: &str) -> Result<(), CommandError> {
    let id = parse_id(raw_id)?;
    if api.delete_product(id).await {
        tracing::info!("Deleted product {id}");
        Ok(())
    } else {
        Err(CommandError::Rejected(format!("Failed to delete product {id}")))
    }
}

/// Flip one product's active flag.
///
/// # Errors
///
/// Returns an error if the id is invalid or the API refuses.
pub async fn toggle(api: &ProductApi, raw_id: &str) -> Result<(), CommandError> {
    let id = parse_id(raw_id)?;
    if api.toggle_product_status(id).await {
        tracing::info!("Toggled status of product {id}");
        Ok(())
    } else {
        Err(CommandError::Rejected(format!(
            "Failed to toggle status of product {id}"
        )))
    }
}

/// List categories.
pub async fn categories(api: &ProductApi) {
    let categories = api.get_categories().await;
    for category in &categories {
        tracing::info!("{}  {}", category.id, category.name);
    }
    tracing::info!("{} categories", categories.len());
}
