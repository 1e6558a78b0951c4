//! Integration tests for the products API client.

use luxe_client::{ApiConfig, ApiError, ProductApi, ProductQuery};
use luxe_core::{ImageSource, ProductDraft, ProductId};
use luxe_integration_tests::{
    HIDDEN_ID, RING_ID, StubApi, StubData, TOTE_ID, closed_port_url, sample_products,
};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;

fn id(raw: &str) -> ProductId {
    raw.parse().unwrap()
}

async fn unreachable_client() -> ProductApi {
    let config = ApiConfig::new(closed_port_url().await.parse().unwrap());
    ProductApi::new(&config).unwrap()
}

fn valid_draft() -> ProductDraft {
    ProductDraft {
        name: "Cashmere Scarf".to_string(),
        description: "Soft two-ply cashmere, 180cm".to_string(),
        price: luxe_core::Price::from_cents(8900),
        sku: "LUX-SCARF-01".to_string(),
        stock_quantity: 12,
        category_id: Some(luxe_integration_tests::BAGS_ID.parse().unwrap()),
        images: vec!["data:image/png;base64,iVBORw0KGgo=".to_string()],
        ..ProductDraft::default()
    }
}

#[tokio::test]
async fn test_get_all_products_decodes_catalog() {
    let stub = StubApi::start().await;
    let products = stub.client().get_all_products(&ProductQuery::all()).await;

    assert_eq!(products.len(), 3);
    let tote = products.iter().find(|p| p.id == id(TOTE_ID)).unwrap();
    assert_eq!(
        tote.image(),
        ImageSource::Url("data:image/jpeg;base64,AAAA".to_string())
    );
    let ring = products.iter().find(|p| p.id == id(RING_ID)).unwrap();
    assert_eq!(ring.price, luxe_core::Price::from_cents(42000));
    assert!(ring.is_out_of_stock());
}

#[tokio::test]
async fn test_featured_query_is_sent_as_query_string() {
    let stub = StubApi::start().await;
    stub.client().get_all_products(&ProductQuery::featured(8)).await;

    let queries = stub.data().queries.clone();
    assert_eq!(
        queries,
        vec!["page=1&pageSize=8&isFeatured=true&inStock=true".to_string()]
    );
}

#[tokio::test]
async fn test_bad_elements_are_skipped() {
    let mut products = sample_products();
    products.push(json!({ "name": "No id or price" }));
    let stub = StubApi::start_with(StubData {
        products,
        ..StubData::default()
    })
    .await;

    assert_eq!(
        stub.client()
            .get_all_products(&ProductQuery::all())
            .await
            .len(),
        3
    );
}

#[tokio::test]
async fn test_reads_fail_soft_on_network_failure() {
    let api = unreachable_client().await;

    assert!(api.get_all_products(&ProductQuery::all()).await.is_empty());
    assert!(api.get_categories().await.is_empty());
    assert!(api.get_product_by_id(id(TOTE_ID)).await.is_none());
    assert_eq!(api.get_products_count().await, 0);
    assert!(!api.delete_product(id(TOTE_ID)).await);
    assert!(!api.toggle_product_status(id(TOTE_ID)).await);
}

#[tokio::test]
async fn test_create_fails_loud_on_network_failure() {
    let api = unreachable_client().await;
    let err = api.create_product(&valid_draft()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.user_message(), "Could not reach the products API");
}

#[tokio::test]
async fn test_get_product_by_id_and_count() {
    let stub = StubApi::start().await;
    let api = stub.client();

    let ring = api.get_product_by_id(id(RING_ID)).await.unwrap();
    assert_eq!(ring.name, "Gold Ring");
    assert!(
        api.get_product_by_id(id("00000000-0000-4000-8000-000000000000"))
            .await
            .is_none()
    );
    assert_eq!(api.get_products_count().await, 3);
}

#[tokio::test]
async fn test_create_product_returns_created() {
    let stub = StubApi::start().await;
    let created = stub
        .client()
        .create_product(&valid_draft())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.name, "Cashmere Scarf");
    let sent = stub.data().created[0].clone();
    assert_eq!(sent["sku"], "LUX-SCARF-01");
    assert_eq!(sent["categoryId"], luxe_integration_tests::BAGS_ID);
    assert_eq!(sent["originalPrice"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_product_on_500_returns_err() {
    let stub = StubApi::start_with(StubData {
        fail_writes: true,
        ..StubData::default()
    })
    .await;

    let err = stub
        .client()
        .create_product(&valid_draft())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(err.user_message(), "SKU already exists");
}

#[tokio::test]
async fn test_update_accepts_no_content() {
    let stub = StubApi::start().await;
    let updated = stub
        .client()
        .update_product(id(TOTE_ID), &valid_draft())
        .await
        .unwrap();

    assert!(updated.is_none());
    assert_eq!(stub.data().updated[0].0, TOTE_ID);
}

#[tokio::test]
async fn test_delete_and_toggle() {
    let stub = StubApi::start().await;
    let api = stub.client();

    assert!(api.toggle_product_status(id(HIDDEN_ID)).await);
    assert!(api.delete_product(id(RING_ID)).await);
    assert!(!api.delete_product(id(RING_ID)).await);

    let data = stub.data();
    assert_eq!(data.toggled, vec![HIDDEN_ID.to_string()]);
    assert_eq!(data.deleted, vec![RING_ID.to_string()]);
    assert_eq!(data.products.len(), 2);
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let stub = StubApi::start().await;
    let mut config = stub.config();
    config.token = Some(SecretString::from("s3cret".to_string()));
    let api = ProductApi::new(&config).unwrap();

    api.get_all_products(&ProductQuery::all()).await;
    stub.client().get_all_products(&ProductQuery::all()).await;

    let auth = stub.data().authorization.clone();
    assert_eq!(auth, vec![Some("Bearer s3cret".to_string()), None]);
}
