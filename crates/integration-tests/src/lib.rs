//! Integration test harness for the JuiceQu storefront.
//!
//! Every test gets its own mock JuiceQu backend and its own storefront,
//! both bound to ephemeral ports, so tests run in parallel without shared
//! state and without a database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p juicequ-integration-tests
//! ```
//!
//! # Mock Backend
//!
//! | Account | Password | Role | Token |
//! |---------|----------|------|-------|
//! | `budi@example.com` | `rahasia123` | customer | `customer-token` |
//! | `kasir@example.com` | `rahasia123` | cashier | `cashier-token` |
//!
//! Catalog: 1 Jus Mangga (Rp 20.000), 2 Jus Alpukat (Rp 25.000, large
//! Rp 32.000), 3 Jus Sirsak (sold out). Product 500 answers with a server
//! error. Voucher `HEMAT10` gives 10% off.
//!
//! The AI chat answers with a default "two large mango juices" reply unless
//! a test queues replies with [`MockBackend::script_chat`] or takes it down
//! with [`MockBackend::fail_chat`].

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_sessions::MemoryStore;
use url::Url;

use juicequ_storefront::config::{BackendConfig, SentryConfig, StorefrontConfig, VoiceConfig};
use juicequ_storefront::middleware::session_layer;
use juicequ_storefront::state::AppState;

/// Password shared by the mock accounts.
pub const PASSWORD: &str = "rahasia123";
/// Customer account email.
pub const CUSTOMER_EMAIL: &str = "budi@example.com";
/// Cashier account email.
pub const CASHIER_EMAIL: &str = "kasir@example.com";

// ============================================================================
// Mock Backend
// ============================================================================

/// Requests observed by the mock backend.
#[derive(Default)]
pub struct Recorded {
    /// Number of `GET /products/{id}` calls.
    pub product_lookups: AtomicUsize,
    /// Bodies of `POST /ai/chat`.
    pub chat_requests: Mutex<Vec<Value>>,
    /// Orders created through `POST /customer/orders`.
    pub orders: Mutex<Vec<Value>>,
    /// Chat replies served in order before the default one.
    pub chat_replies: Mutex<VecDeque<Value>>,
    /// When set, `POST /ai/chat` answers 500.
    pub chat_down: AtomicBool,
}

/// A running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    /// Origin, e.g. `http://127.0.0.1:41234`.
    pub url: String,
    /// What the backend has seen so far.
    pub recorded: Arc<Recorded>,
}

impl MockBackend {
    /// Start a mock backend on an ephemeral port.
    pub async fn spawn() -> Self {
        let recorded = Arc::new(Recorded::default());
        let api = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/categories", get(list_categories))
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/customer/orders", get(customer_orders).post(create_order))
            .route("/customer/vouchers/validate", post(validate_voucher))
            .route("/cashier/orders", get(cashier_orders))
            .route("/cashier/orders/{id}/status", patch(update_status))
            .route("/cashier/reports/daily", get(daily_report))
            .route("/ai/chat", post(chat));

        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .nest("/api/v1", api)
            .with_state(recorded.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            recorded,
        }
    }

    /// Backend settings pointing at this mock.
    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: Url::parse(&self.url).unwrap(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Number of product detail lookups so far.
    pub fn product_lookups(&self) -> usize {
        self.recorded.product_lookups.load(Ordering::SeqCst)
    }

    /// Copy of the chat request bodies so far.
    pub fn chat_requests(&self) -> Vec<Value> {
        self.recorded.chat_requests.lock().unwrap().clone()
    }

    /// Queue a chat reply for the next `POST /ai/chat`.
    pub fn script_chat(&self, reply: Value) {
        self.recorded.chat_replies.lock().unwrap().push_back(reply);
    }

    /// Make every following chat call fail with a server error.
    pub fn fail_chat(&self) {
        self.recorded.chat_down.store(true, Ordering::SeqCst);
    }

    /// Store an order directly, as if another channel had placed it.
    pub fn seed_order(&self, id: u64, status: &str) {
        self.recorded.orders.lock().unwrap().push(json!({
            "id": id,
            "order_number": format!("JQ-20261014-{id:04}"),
            "status": status,
            "payment_status": "unpaid",
            "payment_method": "cash",
            "items": [],
            "subtotal": "20000",
            "discount": "0",
            "total": "20000",
            "created_at": "2026-10-14T07:00:00Z"
        }));
    }

    /// Copy of the orders created so far.
    pub fn orders(&self) -> Vec<Value> {
        self.recorded.orders.lock().unwrap().clone()
    }
}

type Shared = State<Arc<Recorded>>;

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "id": 1, "name": "Jus Mangga", "description": "Mangga harum manis",
            "price": "20000", "category_id": 1, "category_name": "Fresh Juice",
            "is_available": true, "stock": 25, "order_count": 120
        }),
        json!({
            "id": 2, "name": "Jus Alpukat", "description": "Alpukat mentega dengan susu",
            "price": "25000", "category_id": 1, "category_name": "Fresh Juice",
            "is_available": true, "size_prices": {"large": "32000"}, "order_count": 80
        }),
        json!({
            "id": 3, "name": "Jus Sirsak", "price": "18000", "category_id": 2,
            "category_name": "Smoothies", "is_available": false, "order_count": 15
        }),
    ]
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn user_for_token(token: &str) -> Option<Value> {
    match token {
        "customer-token" => Some(json!({
            "id": 7, "email": CUSTOMER_EMAIL, "full_name": "Budi Santoso",
            "role": "customer", "phone": "081234567890"
        })),
        "cashier-token" => Some(json!({
            "id": 2, "email": CASHIER_EMAIL, "full_name": "Sari Kasir", "role": "cashier"
        })),
        _ => None,
    }
}

fn price_of(product: &Value, size: &str) -> Decimal {
    let base: Decimal = product["price"].as_str().unwrap().parse().unwrap();
    if let Some(explicit) = product["size_prices"][size].as_str() {
        return explicit.parse().unwrap();
    }
    match size {
        "small" => base - Decimal::new(3_000, 0),
        "large" => base + Decimal::new(5_000, 0),
        _ => base,
    }
}

#[derive(Deserialize)]
struct ListQuery {
    search: Option<String>,
    category_id: Option<i64>,
    sort: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn list_products(Query(query): Query<ListQuery>) -> Json<Value> {
    let mut items: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| {
            query.search.as_deref().is_none_or(|s| {
                p["name"]
                    .as_str()
                    .unwrap()
                    .to_lowercase()
                    .contains(&s.to_lowercase())
            })
        })
        .filter(|p| query.category_id.is_none_or(|c| p["category_id"] == c))
        .collect();

    match query.sort.as_deref() {
        Some("price_asc") => items.sort_by_key(|p| price_of(p, "medium")),
        Some("price_desc") => items.sort_by_key(|p| std::cmp::Reverse(price_of(p, "medium"))),
        _ => {}
    }

    let page_size = query.page_size.unwrap_or(20);
    Json(json!({
        "items": items,
        "total": items.len(),
        "page": query.page.unwrap_or(1),
        "page_size": page_size
    }))
}

async fn get_product(State(recorded): Shared, Path(id): Path<i64>) -> Response {
    recorded.product_lookups.fetch_add(1, Ordering::SeqCst);
    if id == 500 {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    catalog()
        .into_iter()
        .find(|p| p["id"] == id)
        .map_or_else(
            || detail(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p).into_response(),
        )
}

async fn list_categories() -> Json<Value> {
    Json(json!([
        {"id": 1, "name": "Fresh Juice", "product_count": 2},
        {"id": 2, "name": "Smoothies", "product_count": 1}
    ]))
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(Json(body): Json<Credentials>) -> Response {
    let token = match body.email.as_str() {
        CUSTOMER_EMAIL => "customer-token",
        CASHIER_EMAIL => "cashier-token",
        _ => return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    };
    if body.password != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    }
    Json(json!({
        "access_token": token,
        "token_type": "bearer",
        "user": user_for_token(token)
    }))
    .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if email == CUSTOMER_EMAIL || email == CASHIER_EMAIL {
        return detail(StatusCode::CONFLICT, "Email already registered");
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "access_token": "new-customer-token",
            "user": {
                "id": 30, "email": email, "full_name": body["full_name"], "role": "customer"
            }
        })),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    bearer(&headers).and_then(user_for_token).map_or_else(
        || detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
        |user| Json(user).into_response(),
    )
}

async fn create_order(State(recorded): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers) != Some("customer-token") {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let catalog = catalog();
    let mut subtotal = Decimal::ZERO;
    let mut items = Vec::new();
    for line in body["items"].as_array().cloned().unwrap_or_default() {
        let Some(product) = catalog.iter().find(|p| p["id"] == line["product_id"]) else {
            return detail(StatusCode::NOT_FOUND, "Product not found");
        };
        let size = line["size"].as_str().unwrap_or("medium");
        let quantity = line["quantity"].as_u64().unwrap_or(1);
        let unit = price_of(product, size);
        let line_total = unit * Decimal::from(quantity);
        subtotal += line_total;
        items.push(json!({
            "product_id": product["id"], "product_name": product["name"], "size": size,
            "quantity": quantity, "unit_price": unit.to_string(), "subtotal": line_total.to_string()
        }));
    }

    let discount = if body["voucher_code"] == "HEMAT10" {
        (subtotal / Decimal::from(10)).min(Decimal::new(15_000, 0))
    } else {
        Decimal::ZERO
    };

    let mut orders = recorded.orders.lock().unwrap();
    let id = 100 + orders.len() + 1;
    let order = json!({
        "id": id,
        "order_number": format!("JQ-20261014-{id:04}"),
        "status": "pending",
        "payment_status": "unpaid",
        "payment_method": body["payment_method"],
        "items": items,
        "subtotal": subtotal.to_string(),
        "discount": discount.to_string(),
        "total": (subtotal - discount).to_string(),
        "voucher_code": body["voucher_code"],
        "notes": body["notes"],
        "customer_name": "Budi Santoso",
        "created_at": "2026-10-14T08:30:00Z"
    });
    orders.push(order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn customer_orders(State(recorded): Shared, headers: HeaderMap) -> Response {
    if bearer(&headers) != Some("customer-token") {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    Json(Value::Array(recorded.orders.lock().unwrap().clone())).into_response()
}

async fn validate_voucher(Json(body): Json<Value>) -> Json<Value> {
    let subtotal: Decimal = match &body["subtotal"] {
        Value::String(s) => s.parse().unwrap_or_default(),
        other => other.to_string().parse().unwrap_or_default(),
    };
    if body["code"] == "HEMAT10" {
        let discount = (subtotal / Decimal::from(10)).min(Decimal::new(15_000, 0));
        Json(json!({
            "valid": true,
            "discount_amount": discount.to_string(),
            "voucher": {
                "id": 1, "code": "HEMAT10", "discount_type": "percentage",
                "discount_value": "10", "max_discount": "15000"
            }
        }))
    } else {
        Json(json!({ "valid": false, "message": "Kode voucher tidak ditemukan" }))
    }
}

/// Orders per cashier queue page, like the real backend's default.
const QUEUE_PAGE_SIZE: usize = 20;

async fn cashier_orders(State(recorded): Shared, headers: HeaderMap) -> Response {
    match bearer(&headers).and_then(user_for_token) {
        Some(user) if user["role"] == "cashier" => {
            let orders = recorded.orders.lock().unwrap();
            let page: Vec<Value> = orders.iter().take(QUEUE_PAGE_SIZE).cloned().collect();
            Json(Value::Array(page)).into_response()
        }
        Some(_) => detail(StatusCode::FORBIDDEN, "Not enough permissions"),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn update_status(
    State(recorded): Shared,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut orders = recorded.orders.lock().unwrap();
    let Some(order) = orders.iter_mut().find(|o| o["id"] == id) else {
        return detail(StatusCode::NOT_FOUND, "Order not found");
    };
    order["status"] = body["status"].clone();
    Json(order.clone()).into_response()
}

async fn daily_report() -> Json<Value> {
    Json(json!({
        "date": "2026-10-14", "total_orders": 12, "completed_orders": 10,
        "cancelled_orders": 1, "revenue": "275000"
    }))
}

async fn chat(State(recorded): Shared, Json(body): Json<Value>) -> Response {
    recorded.chat_requests.lock().unwrap().push(body);
    if recorded.chat_down.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "model overloaded" })),
        )
            .into_response();
    }
    let scripted = recorded.chat_replies.lock().unwrap().pop_front();
    Json(scripted.unwrap_or_else(|| {
        json!({
            "response": "Dua jus mangga besar, siap!",
            "session_id": "conv-1",
            "actions": [
                {"type": "add_to_cart", "product_id": 1, "quantity": 2, "size": "large"}
            ]
        })
    }))
    .into_response()
}

// ============================================================================
// Storefront
// ============================================================================

/// A storefront wired to its own mock backend.
pub struct TestApp {
    /// Storefront origin.
    pub url: String,
    /// Cookie-keeping client that does not follow redirects.
    pub client: reqwest::Client,
    /// The mock backend behind the storefront.
    pub backend: MockBackend,
}

impl TestApp {
    /// Start a storefront with the voice assistant enabled.
    pub async fn spawn() -> Self {
        Self::spawn_with(true).await
    }

    /// Start a storefront, choosing whether unmatched voice commands reach
    /// the assistant.
    pub async fn spawn_with(assistant_enabled: bool) -> Self {
        let backend = MockBackend::spawn().await;
        let config = StorefrontConfig {
            // Sessions live in memory; the pool is never used
            database_url: SecretString::from("postgres://juicequ@localhost/juicequ_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("kX9#mQ2$vL7@pR4!wN8&zT3*bY6^cF1%"),
            backend: backend.config(),
            voice: VoiceConfig { assistant_enabled },
            sentry: SentryConfig::default(),
        };

        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://juicequ@localhost/juicequ_test")
            .unwrap();
        let state = AppState::new(config, pool).unwrap();
        let app = juicequ_storefront::app(state, session_layer(MemoryStore::default(), false));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            url: format!("http://{addr}"),
            client,
            backend,
        }
    }

    /// Absolute URL for a storefront path.
    pub fn at(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    /// GET a storefront path.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.at(path)).send().await.unwrap()
    }

    /// POST a form to a storefront path.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.at(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// POST JSON to a storefront path.
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.at(path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Log in through the form and return the redirect target.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post_form("/auth/login", &[("email", email), ("password", PASSWORD)])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login should redirect");
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    /// Send a voice transcript and decode the outcome.
    pub async fn voice(&self, transcript: &str) -> (StatusCode, Value) {
        let response = self
            .post_json("/api/voice/command", &json!({ "transcript": transcript }))
            .await;
        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// Current cart as JSON.
    pub async fn cart(&self) -> Value {
        self.get("/api/cart").await.json().await.unwrap()
    }
}
