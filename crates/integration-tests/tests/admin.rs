//! Integration tests for the admin panel: entry form, management actions and
//! bulk upload.

use luxe_admin::config::AdminConfig;
use luxe_admin::state::AppState;
use luxe_integration_tests::{
    BAGS_ID, PNG_BYTES, RING_ID, StubApi, StubData, TOTE_ID, browser, sample_categories,
    sample_products, serve,
};
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, header};

/// Serve the admin panel against `stub` and return its base URL.
async fn start_admin(stub: &StubApi) -> String {
    let config = AdminConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        api: stub.config(),
        json_logs: false,
        sentry_dsn: None,
    };
    let addr = serve(luxe_admin::app(AppState::with_api(config, stub.client()))).await;
    format!("http://{addr}")
}

fn png(file_name: &str) -> Part {
    Part::bytes(PNG_BYTES.to_vec())
        .file_name(file_name.to_string())
        .mime_str("image/png")
        .unwrap()
}

fn product_form() -> Form {
    Form::new()
        .text("name", "Cashmere Scarf")
        .text("description", "Soft two-ply cashmere, 180cm")
        .text("price", "89.00")
        .text("originalPrice", "")
        .text("sku", "LUX-SCARF-01")
        .text("stockQuantity", "12")
        .text("brand", "Luxe")
        .text("rating", "4.5")
        .text("reviewCount", "0")
        .text("categoryId", BAGS_ID)
        .text("inStock", "on")
        .part("images", png("scarf.png"))
}

fn location(response: &reqwest::Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

#[tokio::test]
async fn test_management_page_shows_stats_and_rows() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let response = browser()
        .get(format!("{base}/products?notice=created"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();

    assert!(html.contains("Product created successfully"));
    // 240.00 x 4 in stock; the others have no stock
    assert!(html.contains("$960.00"));
    assert!(html.contains("Leather Tote"));
    assert!(html.contains("Retired Clutch"));
    assert!(html.contains(&format!("/products/{RING_ID}/edit")));
}

#[tokio::test]
async fn test_management_page_filters_and_paginates() {
    let products = (0..15)
        .map(|i| {
            serde_json::json!({
                "id": uuid::Uuid::new_v4().to_string(),
                "name": format!("Item {i:02}"),
                "price": 10,
                "categoryName": "Bags",
            })
        })
        .chain(sample_products())
        .collect();
    let stub = StubApi::start_with(StubData {
        products,
        categories: sample_categories(),
        ..StubData::default()
    })
    .await;
    let base = start_admin(&stub).await;

    let html = browser()
        .get(format!("{base}/products?category=Bags&page=2"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    // 15 items + tote + clutch in Bags = 17, so page 2 holds 5
    assert!(html.contains("17 matching products"));
    assert!(html.contains("Page 2 of 2"));
    assert!(html.contains("/products?category=Bags&#38;page=1"));
    assert!(!html.contains("Gold Ring"));
}

#[tokio::test]
async fn test_create_product() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let response = browser()
        .post(format!("{base}/products"))
        .multipart(product_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products?notice=created");

    let data = stub.data();
    assert_eq!(data.created.len(), 1);
    let sent = &data.created[0];
    assert_eq!(sent["name"], "Cashmere Scarf");
    assert_eq!(sent["categoryId"], BAGS_ID);
    assert_eq!(sent["isFeatured"], false);
    assert_eq!(sent["inStock"], true);
    assert_eq!(sent["color"], serde_json::Value::Null);
    assert_eq!(sent["images"][0], "data:image/png;base64,iVBORw0KGgo=");
}

#[tokio::test]
async fn test_invalid_form_is_rerendered_with_messages() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let form = Form::new()
        .text("name", "ab")
        .text("description", "short")
        .text("price", "0")
        .text("sku", "LUX-KEEP-ME")
        .text("rating", "7")
        .text("categoryId", "");

    let response = browser()
        .post(format!("{base}/products"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text().await.unwrap();
    assert!(html.contains("Product name must be at least 3 characters"));
    assert!(html.contains("Description must be at least 10 characters"));
    assert!(html.contains("Price must be greater than 0"));
    assert!(html.contains("Rating must be between 0 and 5"));
    assert!(html.contains("Please select a valid category"));
    assert!(html.contains("Please upload at least one product image"));
    assert!(html.contains("value=\"LUX-KEEP-ME\""));
    assert!(stub.data().created.is_empty());
}

#[tokio::test]
async fn test_api_rejection_shows_server_message_and_keeps_images() {
    let stub = StubApi::start_with(StubData {
        categories: sample_categories(),
        fail_writes: true,
        ..StubData::default()
    })
    .await;
    let base = start_admin(&stub).await;

    let response = browser()
        .post(format!("{base}/products"))
        .multipart(product_form())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let html = response.text().await.unwrap();
    assert!(html.contains("SKU already exists"));
    assert!(html.contains("name=\"keepImages\" value=\"data:image/png;base64,iVBORw0KGgo=\""));
    assert!(html.contains("value=\"Cashmere Scarf\""));
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let response = browser()
        .get(format!("{base}/products/{TOTE_ID}/edit"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("value=\"Leather Tote\""));
    assert!(html.contains("value=\"LUX-TOTE-1\""));
    assert!(html.contains(&format!("action=\"/products/{TOTE_ID}\"")));
    assert!(html.contains("data:image/jpeg;base64,AAAA"));

    let missing = browser()
        .get(format!(
            "{base}/products/00000000-0000-4000-8000-000000000000/edit"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_form_lists_every_image() {
    let stub = StubApi::start_with(StubData {
        products: vec![serde_json::json!({
            "id": TOTE_ID,
            "name": "Leather Tote",
            "price": 240,
            "images": ["https://cdn/a.jpg", "https://cdn/b.jpg", "https://cdn/c.jpg"]
        })],
        categories: sample_categories(),
        ..StubData::default()
    })
    .await;
    let base = start_admin(&stub).await;

    let html = browser()
        .get(format!("{base}/products/{TOTE_ID}/edit"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    for url in ["https://cdn/a.jpg", "https://cdn/b.jpg", "https://cdn/c.jpg"] {
        assert!(html.contains(&format!("name=\"keepImages\" value=\"{url}\"")));
    }
}

#[tokio::test]
async fn test_update_keeps_existing_images() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let form = Form::new()
        .text("name", "Leather Tote")
        .text("description", "Hand-stitched full grain leather")
        .text("price", "250.00")
        .text("sku", "LUX-TOTE-1")
        .text("stockQuantity", "4")
        .text("categoryId", BAGS_ID)
        .text("isFeatured", "on")
        .text("inStock", "on")
        .text("keepImages", "data:image/jpeg;base64,AAAA");

    let response = browser()
        .post(format!("{base}/products/{TOTE_ID}"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products?notice=updated");

    let data = stub.data();
    let (id, body) = &data.updated[0];
    assert_eq!(id, TOTE_ID);
    assert_eq!(body["price"], 250.0);
    assert_eq!(body["isFeatured"], true);
    assert_eq!(body["images"], serde_json::json!(["data:image/jpeg;base64,AAAA"]));
}

#[tokio::test]
async fn test_delete_and_toggle_redirect_with_notice() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;
    let client = browser();

    let toggled = client
        .post(format!("{base}/products/{RING_ID}/toggle-status"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&toggled), "/products?notice=toggled");

    let deleted = client
        .post(format!("{base}/products/{RING_ID}/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&deleted), "/products?notice=deleted");

    let again = client
        .post(format!("{base}/products/{RING_ID}/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&again), "/products?notice=delete-failed");

    assert_eq!(stub.data().toggled, vec![RING_ID.to_string()]);
}

#[tokio::test]
async fn test_bulk_upload_reports_each_file() {
    let stub = StubApi::start().await;
    let base = start_admin(&stub).await;

    let form = Form::new()
        .part("images", png("summer-tote_bag.png"))
        .part("images", png("gold-ring.png"))
        .part(
            "images",
            Part::bytes(b"hello".to_vec())
                .file_name("notes.txt")
                .mime_str("text/plain")
                .unwrap(),
        )
        .text("price", "129.00");

    let response = browser()
        .post(format!("{base}/products/bulk"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = response.text().await.unwrap();
    assert!(html.contains("2 created, 1 failed."));
    assert!(html.contains("notes.txt is not a supported image"));

    let data = stub.data();
    assert_eq!(data.created.len(), 2);
    let first = &data.created[0];
    assert_eq!(first["name"], "summer tote bag");
    assert_eq!(first["description"], "Premium summer tote bag product");
    assert_eq!(first["brand"], "Luxe");
    assert_eq!(first["price"], 129.0);
    // No category chosen: the first one is used
    assert_eq!(first["categoryId"], BAGS_ID);
    assert!(first["sku"].as_str().unwrap().starts_with("LUX-"));
    assert!(first["sku"].as_str().unwrap().ends_with("-0"));
    assert_eq!(data.created[1]["name"], "gold ring");
}
