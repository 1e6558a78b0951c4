//! Multipart product forms.
//!
//! The entry and edit forms post `multipart/form-data` so image files can
//! travel with the text fields. Text values are kept as typed so a rejected
//! submission re-renders exactly as the user left it; images are turned into
//! `data:` URLs before the draft is built.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::body::Bytes;
use axum::extract::Multipart;
use luxe_core::validation::{MAX_IMAGE_BYTES, MAX_IMAGES};
use luxe_core::{CategoryId, Price, ProductDraft, ValidationErrors, encode_data_url};
use rust_decimal::Decimal;

use crate::error::Result;

/// Multipart field carrying image files.
pub const IMAGES_FIELD: &str = "images";

/// Multipart field carrying an already-stored image to keep (edit form).
pub const KEEP_IMAGE_FIELD: &str = "keepImages";

/// An uploaded file.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Per-field messages for a rejected form, plus an optional banner message.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
    pub general: Option<String>,
}

impl FormErrors {
    /// Record a message for a field, keeping the first one reported.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Merge rule failures from draft validation.
    pub fn merge(&mut self, errors: &ValidationErrors) {
        for error in errors.errors() {
            self.add(error.field, error.message.clone());
        }
    }

    /// The message for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_none()
    }

    /// Number of fields with a message.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Text values of the product form, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFormValues {
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: String,
    pub sku: String,
    pub stock_quantity: String,
    pub color: String,
    pub size: String,
    pub material: String,
    pub brand: String,
    pub rating: String,
    pub review_count: String,
    pub badge: String,
    pub category_id: String,
    pub is_featured: bool,
    pub in_stock: bool,
}

impl Default for ProductFormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            original_price: String::new(),
            sku: String::new(),
            stock_quantity: "0".to_string(),
            color: String::new(),
            size: String::new(),
            material: String::new(),
            brand: String::new(),
            rating: "0".to_string(),
            review_count: "0".to_string(),
            badge: String::new(),
            category_id: String::new(),
            is_featured: false,
            in_stock: true,
        }
    }
}

impl ProductFormValues {
    /// Pre-fill the form from a draft (edit form).
    #[must_use]
    pub fn from_draft(draft: &ProductDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price.amount().to_string(),
            original_price: draft
                .original_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            sku: draft.sku.clone(),
            stock_quantity: draft.stock_quantity.to_string(),
            color: draft.color.clone().unwrap_or_default(),
            size: draft.size.clone().unwrap_or_default(),
            material: draft.material.clone().unwrap_or_default(),
            brand: draft.brand.clone().unwrap_or_default(),
            rating: draft.rating.to_string(),
            review_count: draft.review_count.to_string(),
            badge: draft.badge.clone().unwrap_or_default(),
            category_id: draft
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            is_featured: draft.is_featured,
            in_stock: draft.in_stock,
        }
    }

    /// Set a text field by its form name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "originalPrice" => self.original_price = value,
            "sku" => self.sku = value,
            "stockQuantity" => self.stock_quantity = value,
            "color" => self.color = value,
            "size" => self.size = value,
            "material" => self.material = value,
            "brand" => self.brand = value,
            "rating" => self.rating = value,
            "reviewCount" => self.review_count = value,
            "badge" => self.badge = value,
            "categoryId" => self.category_id = value,
            "isFeatured" => self.is_featured = is_checked(&value),
            "inStock" => self.in_stock = is_checked(&value),
            _ => {}
        }
    }

    /// Build a draft with the given images, recording unparseable values.
    ///
    /// Fields that fail to parse fall back to their default and get a message,
    /// so validation can still run over the rest of the draft.
    pub fn to_draft(&self, images: Vec<String>, errors: &mut FormErrors) -> ProductDraft {
        let price = parse_field(&self.price, "price", "Price must be a number", errors)
            .map_or(Price::ZERO, Price::new);
        let original_price = if self.original_price.trim().is_empty() {
            None
        } else {
            parse_field::<Decimal>(
                &self.original_price,
                "originalPrice",
                "Original price must be a number",
                errors,
            )
            .map(Price::new)
        };
        let category_id = if self.category_id.trim().is_empty() {
            None
        } else {
            parse_field::<CategoryId>(
                &self.category_id,
                "categoryId",
                "Please select a valid category",
                errors,
            )
        };

        ProductDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            original_price,
            sku: self.sku.clone(),
            stock_quantity: parse_field(
                &self.stock_quantity,
                "stockQuantity",
                "Stock quantity must be a whole number",
                errors,
            )
            .unwrap_or(0),
            color: Some(self.color.clone()),
            size: Some(self.size.clone()),
            material: Some(self.material.clone()),
            brand: Some(self.brand.clone()),
            is_featured: self.is_featured,
            in_stock: self.in_stock,
            rating: parse_field(&self.rating, "rating", "Rating must be a number", errors)
                .unwrap_or(0.0),
            review_count: parse_field(
                &self.review_count,
                "reviewCount",
                "Review count must be a whole number",
                errors,
            )
            .unwrap_or(0),
            badge: Some(self.badge.clone()),
            category_id,
            images,
        }
        .normalized()
    }
}

fn is_checked(value: &str) -> bool {
    matches!(value.trim(), "on" | "true" | "1")
}

fn parse_field<T: FromStr>(
    raw: &str,
    field: &'static str,
    message: &str,
    errors: &mut FormErrors,
) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse()
        .inspect_err(|_| errors.add(field, message))
        .ok()
}

/// A submission that failed to parse or validate, ready to re-render.
#[derive(Debug)]
pub struct RejectedForm {
    pub values: ProductFormValues,
    /// Images that were accepted, so they can be kept on the next attempt.
    pub images: Vec<String>,
    pub errors: FormErrors,
}

/// A decoded product form submission.
#[derive(Debug, Default)]
pub struct ProductForm {
    pub values: ProductFormValues,
    pub files: Vec<UploadedFile>,
    /// Stored images the user chose to keep (edit form).
    pub kept_images: Vec<String>,
}

impl ProductForm {
    /// Read a multipart body.
    ///
    /// Checkboxes only appear in the body when ticked, so both start unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid multipart.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();
        form.values.in_stock = false;

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(String::from) else {
                continue;
            };

            if name == IMAGES_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    form.files.push(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else if name == KEEP_IMAGE_FIELD {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    form.kept_images.push(value);
                }
            } else {
                let value = field.text().await?;
                form.values.set(&name, value);
            }
        }

        Ok(form)
    }

    /// Encode files, merge with kept images and build a validated draft.
    ///
    /// # Errors
    ///
    /// Returns every problem found, keyed by form field.
    pub fn into_draft(self) -> std::result::Result<ProductDraft, RejectedForm> {
        let mut errors = FormErrors::default();
        let mut images = self.kept_images;
        images.extend(encode_uploads(&self.files, &mut errors));

        if images.len() > MAX_IMAGES {
            errors.add("images", format!("Maximum {MAX_IMAGES} images allowed"));
        }

        let draft = self.values.to_draft(images, &mut errors);
        if let Err(rule_errors) = draft.validate() {
            errors.merge(&rule_errors);
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(RejectedForm {
                values: self.values,
                images: draft.images,
                errors,
            })
        }
    }
}

/// Encode each upload as a data URL, reporting files that are too large or
/// not images.
pub fn encode_uploads(files: &[UploadedFile], errors: &mut FormErrors) -> Vec<String> {
    files
        .iter()
        .filter_map(|file| match encode_upload(file) {
            Ok(url) => Some(url),
            Err(message) => {
                errors.add("images", message);
                None
            }
        })
        .collect()
}

/// Encode one upload as a data URL.
///
/// # Errors
///
/// Returns a user-facing message when the file is too large or not an image.
pub fn encode_upload(file: &UploadedFile) -> std::result::Result<String, String> {
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!("{} is larger than 5MB", file.file_name));
    }
    encode_data_url(&file.bytes, file.content_type.as_deref())
        .ok_or_else(|| format!("{} is not a supported image", file.file_name))
}
