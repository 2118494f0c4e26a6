//! Voice commands end to end: rules first, assistant second.

use juicequ_integration_tests::TestApp;
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Local Rules
// ============================================================================

#[tokio::test]
async fn test_navigation_phrases() {
    let app = TestApp::spawn().await;

    let (status, outcome) = app.voice("Tolong buka keranjang!").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["intent"], "navigate");
    assert_eq!(outcome["redirect"], "/cart");
    assert_eq!(outcome["cart_changed"], false);

    let (_, outcome) = app.voice("show me my order history").await;
    assert_eq!(outcome["redirect"], "/account/orders");
}

#[tokio::test]
async fn test_sort_search_and_filter_redirect_to_menu() {
    let app = TestApp::spawn().await;

    let (_, sort) = app.voice("urutkan dari yang termurah").await;
    assert_eq!(sort["intent"], "sort");
    let redirect = sort["redirect"].as_str().expect("sort redirect");
    assert!(redirect.starts_with("/menu?") && redirect.contains("sort=price_asc"));

    let (_, search) = app.voice("cari jus alpukat").await;
    assert_eq!(search["intent"], "search");
    assert!(search["redirect"].as_str().expect("search redirect").contains("search=jus+alpukat"));

    let (_, filter) = app.voice("filter kategori smoothies").await;
    assert_eq!(filter["intent"], "filter");
    assert!(filter["redirect"].as_str().expect("filter redirect").contains("category_id=2"));

    // Unknown categories fall back to the name
    let (_, unknown) = app.voice("filter kategori kopi").await;
    assert!(unknown["redirect"].as_str().expect("filter redirect").contains("category=kopi"));

    assert!(app.backend.chat_requests().is_empty());
}

#[tokio::test]
async fn test_blank_transcript_is_rejected() {
    let app = TestApp::spawn().await;

    let (status, _) = app.voice("   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "jus ".repeat(200);
    let (status, _) = app.voice(&long).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_needs_items() {
    let app = TestApp::spawn().await;

    let (_, outcome) = app.voice("checkout").await;
    assert_eq!(outcome["intent"], "checkout");
    assert!(outcome.get("redirect").is_none());

    app.post_form("/cart/add", &[("product_id", "1")]).await;
    let (_, outcome) = app.voice("bayar sekarang").await;
    assert_eq!(outcome["redirect"], "/checkout");
}

// ============================================================================
// Cart Changes
// ============================================================================

#[tokio::test]
async fn test_assistant_adds_items_and_keeps_conversation() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/api/voice/command",
            &json!({ "transcript": "dua jus mangga yang besar" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    let outcome: serde_json::Value = response.json().await.expect("json outcome");
    assert_eq!(outcome["intent"], "add_to_cart");
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(outcome["cart"]["item_count"], 2);

    let cart = app.cart().await;
    assert_eq!(cart["items"][0]["size"], "large");
    assert_eq!(cart["total_display"], "Rp 50.000");

    app.voice("satu lagi ya").await;
    let requests = app.backend.chat_requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]["session_id"].is_null());
    assert_eq!(requests[1]["session_id"], "conv-1");
    assert_eq!(requests[1]["context"]["source"], "voice");
    assert_eq!(requests[1]["context"]["cart"][0]["product_id"], 1);
}

#[tokio::test]
async fn test_clear_and_remove_by_voice() {
    let app = TestApp::spawn().await;
    app.post_form("/cart/add", &[("product_id", "1"), ("quantity", "3")]).await;
    app.post_form("/cart/add", &[("product_id", "2")]).await;

    let (_, outcome) = app.voice("hapus satu jus mangga").await;
    assert_eq!(outcome["intent"], "remove_from_cart");
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(app.cart().await["item_count"], 3);

    let (_, outcome) = app.voice("kosongkan keranjang").await;
    assert_eq!(outcome["intent"], "clear_cart");
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(app.cart().await["item_count"], 0);

    let (_, outcome) = app.voice("clear my cart").await;
    assert_eq!(outcome["cart_changed"], false);
    assert!(outcome.get("cart").is_none());
}

#[tokio::test]
async fn test_assistant_can_be_disabled() {
    let app = TestApp::spawn_with(false).await;

    let (status, outcome) = app.voice("dua jus mangga yang besar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["intent"], "unknown");
    assert_eq!(outcome["cart_changed"], false);
    assert!(app.backend.chat_requests().is_empty());
}

// ============================================================================
// Assistant Replies
// ============================================================================

#[tokio::test]
async fn test_assistant_failure_is_unknown() {
    let app = TestApp::spawn().await;
    app.backend.fail_chat();

    let (status, outcome) = app.voice("something refreshing for me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["intent"], "unknown");
    assert!(outcome["message"].as_str().expect("message").starts_with("Sorry"));
    assert!(!outcome["message"].as_str().expect("message").contains("overloaded"));
    assert_eq!(outcome["cart_changed"], false);
    assert_eq!(app.backend.chat_requests().len(), 1);
    assert_eq!(app.cart().await["item_count"], 0);
}

#[tokio::test]
async fn test_assistant_quantities_are_capped_per_line() {
    let app = TestApp::spawn().await;
    app.backend.script_chat(json!({
        "response": "Banyak sekali!",
        "actions": [
            {"type": "add_to_cart", "product_id": 1, "quantity": 4_294_967_295_u32},
            {"type": "add_to_cart", "product_id": 2, "quantity": 1}
        ]
    }));

    let (status, outcome) = app.voice("semua jus mangga yang kamu punya").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["intent"], "add_to_cart");
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(outcome["cart"]["item_count"], 100);
}

#[tokio::test]
async fn test_assistant_skips_unavailable_products() {
    let app = TestApp::spawn().await;
    app.backend.script_chat(json!({
        "response": "Satu jus sirsak.",
        "actions": [{"type": "add_to_cart", "product_id": 3, "quantity": 1}]
    }));

    let (_, outcome) = app.voice("satu jus sirsak").await;
    assert_eq!(outcome["intent"], "assistant");
    assert_eq!(outcome["cart_changed"], false);
    assert_eq!(
        outcome["message"],
        "Satu jus sirsak. Jus Sirsak is currently unavailable."
    );
    assert_eq!(app.cart().await["item_count"], 0);
}

#[tokio::test]
async fn test_assistant_ignores_unsupported_and_offsite_actions() {
    let app = TestApp::spawn().await;
    app.backend.script_chat(json!({
        "response": "Ada yang lain?",
        "actions": [
            {"type": "apply_voucher", "code": "HEMAT10"},
            {"type": "navigate", "path": "//evil.example"},
            {"type": "navigate", "path": "/\t/evil.example"},
            {"type": "navigate", "path": "https://evil.example/menu"}
        ]
    }));

    let (status, outcome) = app.voice("pakai voucher terbaik").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["intent"], "assistant");
    assert_eq!(outcome["message"], "Ada yang lain?");
    assert!(outcome.get("redirect").is_none());
    assert_eq!(outcome["cart_changed"], false);

    app.backend.script_chat(json!({
        "response": "Ini pesananmu.",
        "actions": [{"type": "navigate", "path": "/account/orders"}]
    }));
    let (_, outcome) = app.voice("mana pesananku yang kemarin").await;
    assert_eq!(outcome["redirect"], "/account/orders");
}

#[tokio::test]
async fn test_assistant_removes_and_clears() {
    let app = TestApp::spawn().await;
    app.post_form("/cart/add", &[("product_id", "1")]).await;
    app.post_form("/cart/add", &[("product_id", "2"), ("quantity", "2")]).await;

    app.backend.script_chat(json!({
        "response": "Alpukatnya sudah dihapus.",
        "actions": [{"type": "remove_from_cart", "product_id": 2}]
    }));
    let (_, outcome) = app.voice("nggak jadi alpukatnya").await;
    assert_eq!(outcome["intent"], "assistant");
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(outcome["cart"]["item_count"], 1);
    assert_eq!(outcome["cart"]["items"][0]["product_id"], 1);

    app.backend.script_chat(json!({
        "response": "Keranjang kosong.",
        "actions": [{"type": "clear_cart"}]
    }));
    let (_, outcome) = app.voice("mulai dari awal saja").await;
    assert_eq!(outcome["cart_changed"], true);
    assert_eq!(app.cart().await["item_count"], 0);
}
