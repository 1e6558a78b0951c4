//! Luxe CLI - Catalog tools against the products API.
//!
//! # Usage
//!
//! ```bash
//! # List products, optionally filtered
//! luxe-cli products list --search tote
//!
//! # Inspect or change one product
//! luxe-cli products show 6f9619ff-8b86-d011-b42d-00c04fc964ff
//! luxe-cli products toggle 6f9619ff-8b86-d011-b42d-00c04fc964ff
//!
//! # Create one product per image in a folder
//! luxe-cli bulk-upload ./photos --price 129.00 --stock 5 --category Bags
//! ```
//!
//! # Commands
//!
//! - `products` - List, count, show, delete and toggle products
//! - `categories` - List categories
//! - `bulk-upload` - Create products from a folder of images
//!
//! The API is selected with `LUXE_ENV` / `LUXE_API_BASE_URL` (see
//! `luxe_client::ApiConfig`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;

#[derive(Parser)]
#[command(name = "luxe-cli")]
#[command(author, version, about = "Luxe catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List categories
    Categories,
    /// Create one product per image file in a directory
    BulkUpload {
        /// Directory containing product images
        dir: PathBuf,

        /// Price for every created product
        #[arg(long)]
        price: Option<Decimal>,

        /// Stock quantity for every created product
        #[arg(long)]
        stock: Option<i32>,

        /// Category name or id (default: first category)
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Only products whose name or category contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only featured products
        #[arg(long)]
        featured: bool,
    },
    /// Show the total product count
    Count,
    /// Show one product
    Show {
        /// Product id (GUID)
        id: String,
    },
    /// Delete a product
    Delete {
        /// Product id (GUID)
        id: String,
    },
    /// Flip a product's active flag
    Toggle {
        /// Product id (GUID)
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let api = commands::connect()?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List { search, featured } => {
                commands::catalog::list(&api, search, featured).await;
            }
            ProductAction::Count => commands::catalog::count(&api).await,
            ProductAction::Show { id } => commands::catalog::show(&api, &id).await?,
            ProductAction::Delete { id } => commands::catalog::delete(&api, &id).await?,
            ProductAction::Toggle { id } => commands::catalog::toggle(&api, &id).await?,
        },
        Commands::Categories => commands::catalog::categories(&api).await,
        Commands::BulkUpload {
            dir,
            price,
            stock,
            category,
        } => {
            let summary =
                commands::bulk::upload_dir(&api, &dir, price, stock, category.as_deref()).await?;
            if summary.failed > 0 {
                return Err(format!("{} of {} uploads failed", summary.failed, summary.total()).into());
            }
        }
    }
    Ok(())
}
