//! Product management page and row actions.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use luxe_client::ProductQuery;
use luxe_core::catalog::{ALL_CATEGORIES, InventoryStats, ProductFilter, paginate};
use luxe_core::{Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use super::{CategoryOption, render};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Products shown per management page.
pub const PER_PAGE: usize = 12;

/// Management page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ManageQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
    pub notice: Option<String>,
}

/// Outcome banner shown after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Updated,
    Deleted,
    DeleteFailed,
    Toggled,
    ToggleFailed,
}

impl Notice {
    /// Parse the `notice` query value. Unknown values show nothing.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "delete-failed" => Some(Self::DeleteFailed),
            "toggled" => Some(Self::Toggled),
            "toggle-failed" => Some(Self::ToggleFailed),
            _ => None,
        }
    }

    /// Redirect to the management page carrying this notice.
    #[must_use]
    pub fn redirect(self) -> Redirect {
        Redirect::to(&format!("/products?notice={}", self.query_value()))
    }

    const fn query_value(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::DeleteFailed => "delete-failed",
            Self::Toggled => "toggled",
            Self::ToggleFailed => "toggle-failed",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Created => "Product created successfully",
            Self::Updated => "Product updated successfully",
            Self::Deleted => "Product deleted",
            Self::DeleteFailed => "Failed to delete product",
            Self::Toggled => "Product status updated",
            Self::ToggleFailed => "Failed to update product status",
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::DeleteFailed | Self::ToggleFailed)
    }
}

/// Headline numbers, formatted.
#[derive(Debug, Clone)]
pub struct StatsView {
    pub total_products: usize,
    pub active_products: usize,
    pub out_of_stock: usize,
    pub inventory_value: String,
}

impl From<InventoryStats> for StatsView {
    fn from(stats: InventoryStats) -> Self {
        Self {
            total_products: stats.total_products,
            active_products: stats.active_products,
            out_of_stock: stats.out_of_stock,
            inventory_value: stats.inventory_value.to_string(),
        }
    }
}

/// One row of the management table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub price: String,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub out_of_stock: bool,
    pub image: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            category: product.category_label().to_string(),
            price: product.price.to_string(),
            stock_quantity: product.stock_quantity,
            is_active: product.is_active,
            is_featured: product.is_featured,
            out_of_stock: product.is_out_of_stock(),
            image: product.image().url().map(String::from),
        }
    }
}

/// Products management page template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub notice: Option<Notice>,
    pub stats: StatsView,
    pub rows: Vec<ProductRow>,
    pub matched: usize,
    pub categories: Vec<CategoryOption>,
    pub search: String,
    pub all_selected: bool,
    pub page: usize,
    pub total_pages: usize,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

/// Link to another page of the current filtered listing.
fn page_url(filter: &ProductFilter, page: usize) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if !filter.search.is_empty() {
        query.append_pair("search", &filter.search);
    }
    if !filter.category.is_empty() && filter.category != ALL_CATEGORIES {
        query.append_pair("category", &filter.category);
    }
    query.append_pair("page", &page.to_string());
    format!("/products?{}", query.finish())
}

/// Products management page handler.
///
/// Stats cover the whole catalog; the table shows the filtered page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ManageQuery>,
) -> Result<Html<String>> {
    let filter = ProductFilter::new(query.search.as_deref(), query.category.as_deref());

    let all = ProductQuery::all();
    let (products, categories) = tokio::join!(
        state.api().get_all_products(&all),
        state.api().get_categories(),
    );

    let stats = StatsView::from(InventoryStats::from_products(&products));
    let matching = filter.apply(&products);
    let matched = matching.len();
    let page = paginate(matching, query.page.unwrap_or(1), PER_PAGE);

    let template = ProductsIndexTemplate {
        notice: query.notice.as_deref().and_then(Notice::from_query),
        stats,
        rows: page.items.iter().map(|p| ProductRow::from(*p)).collect(),
        matched,
        categories: CategoryOption::by_name(&categories, &filter.category),
        all_selected: filter.category.is_empty() || filter.category == ALL_CATEGORIES,
        page: page.page,
        total_pages: page.total_pages,
        previous_url: page
            .has_previous()
            .then(|| page_url(&filter, page.page - 1)),
        next_url: page.has_next().then(|| page_url(&filter, page.page + 1)),
        search: filter.search,
    };

    render(&template)
}

pub(crate) fn parse_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id '{raw}'")))
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let notice = if state.api().delete_product(id).await {
        tracing::info!(product_id = %id, "Product deleted");
        Notice::Deleted
    } else {
        Notice::DeleteFailed
    };
    Ok(notice.redirect())
}

/// Flip a product's active flag.
#[instrument(skip(state))]
pub async fn toggle_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = parse_id(&id)?;
    let notice = if state.api().toggle_product_status(id).await {
        Notice::Toggled
    } else {
        Notice::ToggleFailed
    };
    Ok(notice.redirect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_round_trip() {
        for notice in [
            Notice::Created,
            Notice::Updated,
            Notice::Deleted,
            Notice::DeleteFailed,
            Notice::Toggled,
            Notice::ToggleFailed,
        ] {
            assert_eq!(Notice::from_query(notice.query_value()), Some(notice));
        }
        assert_eq!(Notice::from_query("<script>"), None);
        assert!(Notice::DeleteFailed.is_error());
        assert!(!Notice::Created.is_error());
    }

    #[test]
    fn test_page_url_keeps_filters() {
        let filter = ProductFilter::new(Some("gold ring"), Some("Fine Jewelry"));
        assert_eq!(
            page_url(&filter, 2),
            "/products?search=gold+ring&category=Fine+Jewelry&page=2"
        );

        let unfiltered = ProductFilter::new(None, Some("all"));
        assert_eq!(page_url(&unfiltered, 3), "/products?page=3");
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("6f9619ff-8b86-d011-b42d-00c04fc964ff").is_ok());
        assert!(matches!(parse_id("42"), Err(AppError::BadRequest(_))));
    }
}
