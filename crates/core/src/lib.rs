//! Luxe Core - Shared catalog and cart library.
//!
//! This crate provides the types and pure logic used across all Luxe components:
//! - `storefront` - Public-facing catalog and cart
//! - `admin` - Product entry and management panel
//! - `cli` - Command-line catalog tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The catalog itself lives behind the external products API; see the
//! `luxe-client` crate for the HTTP side.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`product`] - Products, categories and the create/update payload
//! - [`images`] - Normalization of the heterogeneous `images` field
//! - [`cart`] - The session cart store
//! - [`catalog`] - Listing filters, inventory statistics and bulk drafts
//! - [`validation`] - Product draft validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod images;
pub mod product;
pub mod types;
pub mod validation;

pub use cart::{CartImage, CartItem, CartProduct, CartStore};
pub use images::{
    ImageFormat, ImageSource, ProductGallery, ProductImages, decode_data_url, encode_data_url,
};
pub use product::{Category, Product, ProductDraft};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
