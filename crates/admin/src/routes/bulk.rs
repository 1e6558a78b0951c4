//! Bulk image upload: one product per image file.
//!
//! Each file becomes its own create call. There is no rollback: files that
//! fail are reported next to the ones that were created.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    response::Html,
};
use luxe_core::catalog::{BulkDefaults, bulk_draft};
use luxe_core::{Category, CategoryId, Price};
use rust_decimal::Decimal;
use tracing::instrument;

use super::render;
use crate::error::Result;
use crate::filters;
use crate::forms::{IMAGES_FIELD, UploadedFile, encode_upload};
use crate::state::AppState;

/// Outcome of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkResultRow {
    pub file_name: String,
    pub product_name: String,
    pub ok: bool,
    pub message: String,
}

/// Bulk upload result page template.
#[derive(Template)]
#[template(path = "products/bulk_result.html")]
pub struct BulkResultTemplate {
    pub rows: Vec<BulkResultRow>,
    pub created: usize,
    pub failed: usize,
}

/// A decoded bulk upload submission.
#[derive(Debug, Default)]
struct BulkUpload {
    files: Vec<UploadedFile>,
    category_id: Option<CategoryId>,
    price: Option<Price>,
    stock_quantity: Option<i32>,
}

impl BulkUpload {
    /// Read the multipart body. Unparseable overrides fall back to defaults.
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut upload = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGES_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    upload.files.push(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field.text().await?;
            let value = value.trim();
            match name.as_str() {
                "categoryId" => upload.category_id = value.parse().ok(),
                "price" => upload.price = value.parse::<Decimal>().ok().map(Price::new),
                "stockQuantity" => upload.stock_quantity = value.parse().ok(),
                _ => {}
            }
        }

        Ok(upload)
    }

    fn defaults(&self) -> BulkDefaults {
        let mut defaults = BulkDefaults::default();
        if let Some(price) = self.price {
            defaults.price = price;
        }
        if let Some(stock) = self.stock_quantity {
            defaults.stock_quantity = stock;
        }
        defaults
    }

    /// The chosen category, or the first one when none was chosen.
    fn category<'a>(&self, categories: &'a [Category]) -> Option<&'a Category> {
        self.category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .or_else(|| categories.first())
    }
}

/// Create one product per uploaded image.
#[instrument(skip(state, multipart))]
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Result<Html<String>> {
    let upload = BulkUpload::from_multipart(multipart).await?;
    let categories = state.api().get_categories().await;
    let category = upload.category(&categories);
    let defaults = upload.defaults();
    let batch = chrono::Utc::now().timestamp_millis();

    let mut rows = Vec::with_capacity(upload.files.len());
    for (index, file) in upload.files.iter().enumerate() {
        let image = match encode_upload(file) {
            Ok(image) => image,
            Err(message) => {
                rows.push(BulkResultRow {
                    file_name: file.file_name.clone(),
                    product_name: String::new(),
                    ok: false,
                    message,
                });
                continue;
            }
        };

        let draft = bulk_draft(&file.file_name, image, category, &defaults, batch, index);
        let product_name = draft.name.clone();

        let outcome = match draft.validate() {
            Err(errors) => Err(errors.to_string()),
            Ok(()) => state
                .api()
                .create_product(&draft)
                .await
                .map_err(|e| e.user_message()),
        };

        let row = match outcome {
            Ok(_) => BulkResultRow {
                file_name: file.file_name.clone(),
                product_name,
                ok: true,
                message: "Created".to_string(),
            },
            Err(message) => {
                tracing::warn!(file = %file.file_name, %message, "Bulk upload item failed");
                BulkResultRow {
                    file_name: file.file_name.clone(),
                    product_name,
                    ok: false,
                    message,
                }
            }
        };
        rows.push(row);
    }

    let created = rows.iter().filter(|r| r.ok).count();
    tracing::info!(batch, created, total = rows.len(), "Bulk upload finished");

    render(&BulkResultTemplate {
        failed: rows.len() - created,
        created,
        rows,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn category(n: u128, name: &str) -> Category {
        Category {
            id: CategoryId::new(uuid::Uuid::from_u128(n)),
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_category_defaults_to_first() {
        let categories = vec![category(1, "Bags"), category(2, "Jewelry")];

        let upload = BulkUpload::default();
        assert_eq!(upload.category(&categories).unwrap().name, "Bags");

        let chosen = BulkUpload {
            category_id: Some(categories[1].id),
            ..BulkUpload::default()
        };
        assert_eq!(chosen.category(&categories).unwrap().name, "Jewelry");

        assert!(upload.category(&[]).is_none());
    }

    #[test]
    fn test_overrides_apply_to_defaults() {
        let upload = BulkUpload {
            price: Some(Price::from_cents(15000)),
            stock_quantity: Some(0),
            ..BulkUpload::default()
        };
        let defaults = upload.defaults();
        assert_eq!(defaults.price, Price::from_cents(15000));
        assert_eq!(defaults.stock_quantity, 0);
        assert_eq!(defaults.brand, "Luxe");
    }
}
