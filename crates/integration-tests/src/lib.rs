//! Integration tests for Luxe.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p luxe-integration-tests
//! ```
//!
//! Nothing external is needed: each test starts an in-process stand-in for
//! the products API on an ephemeral port ([`StubApi`]) and, where it tests a
//! web surface, serves the storefront or admin router next to it.
//!
//! # Test Categories
//!
//! - `client` - Products API client against the stub
//! - `storefront` - Catalog pages and the session cart
//! - `admin` - Product entry, management actions and bulk upload

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, patch},
};
use luxe_client::{ApiConfig, ProductApi};
use serde_json::{Value, json};

/// Category ids used by [`sample_categories`].
pub const BAGS_ID: &str = "7a1d4c35-0c44-4b5c-8d2a-3f1e7e0a9b22";
pub const JEWELRY_ID: &str = "1c3e5a7b-9d2f-4e6a-8b0c-2d4f6a8c0e13";

/// Product ids used by [`sample_products`].
pub const TOTE_ID: &str = "0b6c53c4-9d0c-4a39-8f4e-2a8e2c1f7a11";
pub const RING_ID: &str = "5e2d9b7a-3c1f-4a8e-9b6d-7f0a2c4e6b81";
pub const HIDDEN_ID: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";

/// What the stub serves and what it has seen.
#[derive(Debug, Default)]
pub struct StubData {
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    /// Answer every write with `500` and a JSON problem body.
    pub fail_writes: bool,
    /// Bodies of `POST /Products`.
    pub created: Vec<Value>,
    /// `(id, body)` of `PUT /Products/{id}`.
    pub updated: Vec<(String, Value)>,
    pub deleted: Vec<String>,
    pub toggled: Vec<String>,
    /// `Authorization` header of every request, if present.
    pub authorization: Vec<Option<String>>,
    /// Raw query strings of `GET /Products`.
    pub queries: Vec<String>,
}

/// An in-process products API.
#[derive(Clone)]
pub struct StubApi {
    data: Arc<Mutex<StubData>>,
    addr: SocketAddr,
}

impl StubApi {
    /// Start a stub serving the sample catalog.
    pub async fn start() -> Self {
        Self::start_with(StubData {
            products: sample_products(),
            categories: sample_categories(),
            ..StubData::default()
        })
        .await
    }

    /// Start a stub serving `data`.
    pub async fn start_with(data: StubData) -> Self {
        let data = Arc::new(Mutex::new(data));
        let router = Router::new()
            .route("/api/Products", get(list_products).post(create_product))
            .route("/api/Products/count", get(count_products))
            .route(
                "/api/Products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/Products/{id}/toggle-status", patch(toggle_product))
            .route("/api/Categories", get(list_categories))
            .with_state(Arc::clone(&data));
        let addr = serve(router).await;
        Self { data, addr }
    }

    /// Base URL of the stub, including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Client configuration pointing at the stub.
    #[must_use]
    pub fn config(&self) -> ApiConfig {
        ApiConfig::new(self.base_url().parse().unwrap())
    }

    /// A client pointing at the stub.
    #[must_use]
    pub fn client(&self) -> ProductApi {
        ProductApi::new(&self.config()).unwrap()
    }

    /// Inspect or change what the stub holds.
    pub fn data(&self) -> MutexGuard<'_, StubData> {
        self.data.lock().unwrap()
    }
}

type Shared = State<Arc<Mutex<StubData>>>;

fn record_auth(data: &mut StubData, headers: &HeaderMap) {
    data.authorization.push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    );
}

fn write_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "SKU already exists" })),
    )
        .into_response()
}

async fn list_products(
    State(data): Shared,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Json<Value> {
    let mut data = data.lock().unwrap();
    record_auth(&mut data, &headers);
    data.queries.push(query.unwrap_or_default());
    Json(Value::Array(data.products.clone()))
}

async fn count_products(State(data): Shared) -> Json<Value> {
    Json(json!(data.lock().unwrap().products.len()))
}

async fn get_product(State(data): Shared, Path(id): Path<String>) -> Response {
    let data = data.lock().unwrap();
    data.products
        .iter()
        .find(|p| p["id"] == id.as_str())
        .map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            |p| Json(p.clone()).into_response(),
        )
}

async fn create_product(State(data): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut data = data.lock().unwrap();
    record_auth(&mut data, &headers);
    if data.fail_writes {
        return write_failure();
    }

    let mut created = body.clone();
    created["id"] = json!(uuid::Uuid::new_v4().to_string());
    created["isActive"] = json!(true);
    data.created.push(body);
    data.products.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn update_product(
    State(data): Shared,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = data.lock().unwrap();
    if data.fail_writes {
        return write_failure();
    }
    data.updated.push((id, body));
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_product(State(data): Shared, Path(id): Path<String>) -> StatusCode {
    let mut data = data.lock().unwrap();
    let before = data.products.len();
    data.products.retain(|p| p["id"] != id.as_str());
    if data.products.len() == before {
        return StatusCode::NOT_FOUND;
    }
    data.deleted.push(id);
    StatusCode::NO_CONTENT
}

async fn toggle_product(State(data): Shared, Path(id): Path<String>) -> StatusCode {
    let mut data = data.lock().unwrap();
    let Some(product) = data.products.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return StatusCode::NOT_FOUND;
    };
    let active = product["isActive"].as_bool().unwrap_or(true);
    product["isActive"] = json!(!active);
    data.toggled.push(id);
    StatusCode::OK
}

async fn list_categories(State(data): Shared) -> Json<Value> {
    Json(Value::Array(data.lock().unwrap().categories.clone()))
}

/// Serve a router on an ephemeral local port and return its address.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// A browser-like client that keeps cookies and does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[must_use]
pub fn sample_categories() -> Vec<Value> {
    vec![
        json!({ "id": BAGS_ID, "name": "Bags", "description": "Totes and clutches" }),
        json!({ "id": JEWELRY_ID, "name": "Jewelry" }),
    ]
}

#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({
            "id": TOTE_ID,
            "name": "Leather Tote",
            "description": "Hand-stitched full grain leather",
            "price": 240.0,
            "originalPrice": 300,
            "images": ["data:image/jpeg", "base64,AAAA"],
            "categoryId": BAGS_ID,
            "categoryName": "Bags",
            "rating": 4.6,
            "reviewCount": 18,
            "sku": "LUX-TOTE-1",
            "stockQuantity": 4,
            "inStock": true,
            "isActive": true,
            "isFeatured": true
        }),
        json!({
            "id": RING_ID,
            "name": "Gold Ring",
            "description": "Solid 18k gold band",
            "price": "420.00",
            "images": "https://cdn.luxe.test/ring.jpg",
            "categoryId": JEWELRY_ID,
            "categoryName": "Jewelry",
            "stockQuantity": 0,
            "inStock": false,
            "isActive": true,
            "isFeatured": false
        }),
        json!({
            "id": HIDDEN_ID,
            "name": "Retired Clutch",
            "price": 80,
            "images": null,
            "categoryName": "Bags",
            "isActive": false
        }),
    ]
}

/// A minimal PNG header, enough for signature sniffing.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
