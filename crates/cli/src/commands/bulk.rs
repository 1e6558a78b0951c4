//! Bulk upload of a folder of product images.
//!
//! Every image file in the directory (not recursive) becomes one product.
//! Creates are sent one after another and are not rolled back on failure.
//!
//! # Usage
//!
//! ```bash
//! luxe-cli bulk-upload ./photos
//! luxe-cli bulk-upload ./photos --price 49.50 --stock 0 --category Jewelry
//! ```

use std::path::{Path, PathBuf};

use luxe_client::ProductApi;
use luxe_core::catalog::{BulkDefaults, bulk_draft};
use luxe_core::validation::MAX_IMAGE_BYTES;
use luxe_core::{Category, Price, encode_data_url};
use rust_decimal::Decimal;

use super::CommandError;

/// File extensions picked up from the directory.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Counts reported at the end of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub created: usize,
    pub failed: usize,
}

impl UploadSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.failed
    }
}

/// MIME type declared for a file, from its extension.
fn declared_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Image files in `dir`, sorted by name so SKU indexes are stable.
fn image_files(dir: &Path) -> Result<Vec<PathBuf>, CommandError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Find a category by id or case-insensitive name, else the first one.
fn resolve_category<'a>(categories: &'a [Category], wanted: Option<&str>) -> Option<&'a Category> {
    let Some(wanted) = wanted.map(str::trim).filter(|w| !w.is_empty()) else {
        return categories.first();
    };
    categories
        .iter()
        .find(|c| c.id.to_string() == wanted || c.name.eq_ignore_ascii_case(wanted))
}

/// Create one product per image file in `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a requested category
/// does not exist. Individual file failures are logged and counted.
pub async fn upload_dir(
    api: &ProductApi,
    dir: &Path,
    price: Option<Decimal>,
    stock: Option<i32>,
    category: Option<&str>,
) -> Result<UploadSummary, CommandError> {
    let files = image_files(dir)?;
    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "No image files found");
        return Ok(UploadSummary::default());
    }

    let categories = api.get_categories().await;
    let chosen = resolve_category(&categories, category);
    if let (Some(wanted), None) = (category, chosen) {
        return Err(CommandError::NotFound(format!("category '{wanted}'")));
    }

    let mut defaults = BulkDefaults::default();
    if let Some(price) = price {
        defaults.price = Price::new(price);
    }
    if let Some(stock) = stock {
        defaults.stock_quantity = stock;
    }

    let batch = chrono::Utc::now().timestamp_millis();
    tracing::info!(
        files = files.len(),
        category = chosen.map_or("(none)", |c| c.name.as_str()),
        batch,
        "Starting bulk upload"
    );

    let mut summary = UploadSummary::default();
    for (index, path) in files.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match upload_one(api, path, &file_name, chosen, &defaults, batch, index).await {
            Ok(name) => {
                summary.created += 1;
                tracing::info!("  created  {file_name} -> {name}");
            }
            Err(message) => {
                summary.failed += 1;
                tracing::error!("  failed   {file_name}: {message}");
            }
        }
    }

    tracing::info!(
        "Bulk upload finished: {} created, {} failed",
        summary.created,
        summary.failed
    );
    Ok(summary)
}

/// Read, encode, validate and create one file. Returns the product name.
async fn upload_one(
    api: &ProductApi,
    path: &Path,
    file_name: &str,
    category: Option<&Category>,
    defaults: &BulkDefaults,
    batch: i64,
    index: usize,
) -> Result<String, String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| e.to_string())?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err("larger than 5MB".to_string());
    }
    let image = encode_data_url(&bytes, declared_mime(path))
        .ok_or_else(|| "not a supported image".to_string())?;

    let draft = bulk_draft(file_name, image, category, defaults, batch, index);
    draft.validate().map_err(|e| e.to_string())?;
    api.create_product(&draft)
        .await
        .map_err(|e| e.user_message())?;
    Ok(draft.name)
}
