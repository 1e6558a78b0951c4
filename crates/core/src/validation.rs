//! Product draft validation.
//!
//! Mirrors the rules of the product entry form so a bad draft is rejected
//! before it is sent to the API. Every failing field is reported, not just the
//! first, so the form can mark them all at once.
//!
//! ## Rules
//! ```text
//! name           >= 3 characters
//! description    >= 10 characters
//! price          >= 0.01
//! original_price >= 0.01 when present
//! sku            not blank
//! stock_quantity >= 0
//! rating         0..=5
//! category_id    present
//! images         1..=MAX_IMAGES
//! ```

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::product::ProductDraft;

/// Maximum number of images per product.
pub const MAX_IMAGES: usize = 5;

/// Maximum size of a single uploaded image file (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const MIN_NAME_CHARS: usize = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name, camelCase as the API spells it.
    pub field: &'static str,
    /// Message suitable for showing next to the field.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All failed rules for a draft. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid product: {}", format_field_errors(.0))]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// The message for a field, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates failures while rules run.
#[derive(Default)]
struct Collector(Vec<FieldError>);

impl Collector {
    fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.0.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.0))
        }
    }
}

impl ProductDraft {
    /// Check the draft against the entry form rules.
    ///
    /// # Errors
    ///
    /// Returns every rule the draft breaks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let min_price = Decimal::new(1, 2);
        let mut c = Collector::default();

        c.check(
            self.name.trim().chars().count() >= MIN_NAME_CHARS,
            "name",
            "Product name must be at least 3 characters",
        );
        c.check(
            self.description.trim().chars().count() >= MIN_DESCRIPTION_CHARS,
            "description",
            "Description must be at least 10 characters",
        );
        c.check(
            self.price.amount() >= min_price,
            "price",
            "Price must be greater than 0",
        );
        c.check(
            self.original_price
                .is_none_or(|original| original.amount() >= min_price),
            "originalPrice",
            "Original price must be greater than 0",
        );
        c.check(!self.sku.trim().is_empty(), "sku", "SKU is required");
        c.check(
            self.stock_quantity >= 0,
            "stockQuantity",
            "Stock quantity cannot be negative",
        );
        c.check(
            (0.0..=5.0).contains(&self.rating),
            "rating",
            "Rating must be between 0 and 5",
        );
        c.check(
            self.category_id.is_some(),
            "categoryId",
            "Please select a valid category",
        );
        c.check(
            !self.images.is_empty(),
            "images",
            "Please upload at least one product image",
        );
        c.check(
            self.images.len() <= MAX_IMAGES,
            "images",
            format!("Maximum {MAX_IMAGES} images allowed"),
        );

        c.finish()
    }
}
