//! Backend client behavior against the mock JuiceQu API.

use juicequ_core::ProductId;
use juicequ_storefront::backend::{AccessToken, ApiError, BackendClient, ProductQuery, ProductSort};
use juicequ_storefront::config::BackendConfig;
use juicequ_integration_tests::{CUSTOMER_EMAIL, MockBackend, PASSWORD};
use rust_decimal::Decimal;
use std::time::Duration;

async fn client() -> (MockBackend, BackendClient) {
    let backend = MockBackend::spawn().await;
    let client = BackendClient::new(&backend.config()).expect("client should build");
    (backend, client)
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_list_products_decodes_page() {
    let (_backend, client) = client().await;

    let page = client
        .list_products(&ProductQuery {
            sort: Some(ProductSort::PriceDesc),
            ..ProductQuery::default()
        })
        .await
        .expect("listing should succeed");

    assert_eq!(page.total, 3);
    assert_eq!(page.items.first().map(|p| p.name.as_str()), Some("Jus Alpukat"));
    let sirsak = page.items.iter().find(|p| p.id == ProductId::new(3)).expect("sirsak listed");
    assert!(!sirsak.is_orderable());
}

#[tokio::test]
async fn test_search_passes_term_to_backend() {
    let (_backend, client) = client().await;

    let page = client
        .list_products(&ProductQuery::search("mangga"))
        .await
        .expect("search should succeed");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].display_price(), "Rp 20.000");
}

#[tokio::test]
async fn test_product_detail_is_cached() {
    let (backend, client) = client().await;

    let first = client.get_product(ProductId::new(2)).await.expect("first lookup");
    let second = client.get_product(ProductId::new(2)).await.expect("second lookup");

    assert_eq!(first.name, second.name);
    assert_eq!(backend.product_lookups(), 1);
    assert_eq!(
        first.price_for(juicequ_core::DrinkSize::Large),
        Decimal::new(32_000, 0)
    );

    client.invalidate_catalog().await;
    client.get_product(ProductId::new(2)).await.expect("lookup after invalidation");
    assert_eq!(backend.product_lookups(), 2);
}

#[tokio::test]
async fn test_find_category_is_case_insensitive() {
    let (_backend, client) = client().await;

    let found = client.find_category("smoothies").await.expect("categories load");
    assert_eq!(found.map(|c| c.name), Some("Smoothies".to_string()));
    assert!(client.find_category("kopi").await.expect("categories load").is_none());
}

// ============================================================================
// Error Mapping
// ============================================================================

#[tokio::test]
async fn test_missing_product_maps_to_not_found() {
    let (_backend, client) = client().await;

    let err = client.get_product(ProductId::new(404)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "Product not found"));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_detail() {
    let (_backend, client) = client().await;

    let err = client.get_product(ProductId::new(500)).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let (_backend, client) = client().await;

    let err = client.login(CUSTOMER_EMAIL, "salah").await.unwrap_err();
    assert!(err.is_unauthorized());

    let ok = client.login(CUSTOMER_EMAIL, PASSWORD).await.expect("login");
    assert_eq!(ok.user.full_name, "Budi Santoso");
}

#[tokio::test]
async fn test_protected_endpoint_rejects_stale_token() {
    let (_backend, client) = client().await;

    let err = client
        .list_orders(&AccessToken::new("expired"))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

// ============================================================================
// Vouchers & Health
// ============================================================================

#[tokio::test]
async fn test_validate_voucher() {
    let (_backend, client) = client().await;

    let valid = client
        .validate_voucher("HEMAT10", Decimal::new(50_000, 0), None)
        .await
        .expect("validation");
    assert!(valid.valid);
    assert_eq!(valid.discount_amount, Decimal::new(5_000, 0));

    let invalid = client
        .validate_voucher("NOPE", Decimal::new(50_000, 0), None)
        .await
        .expect("validation");
    assert!(!invalid.valid);
    assert_eq!(invalid.message.as_deref(), Some("Kode voucher tidak ditemukan"));
}

#[tokio::test]
async fn test_health_check() {
    let (_backend, client) = client().await;
    assert!(client.is_healthy().await);

    // Nothing listens on the discard port
    let dead = BackendClient::new(&BackendConfig {
        base_url: "http://127.0.0.1:9".parse().expect("valid url"),
        timeout: Duration::from_secs(1),
    })
    .expect("client should build");
    assert!(!dead.is_healthy().await);
}
