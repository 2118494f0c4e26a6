//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /menu                   - Menu (?search, ?category_id, ?category, ?sort, ?page)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Database and backend reachability
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/voucher           - Validate and apply a voucher
//! POST /cart/voucher/remove    - Drop the applied voucher
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Review page
//! POST /checkout               - Place the order
//!
//! # Auth (rate limited)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! GET  /auth/google/login      - Redirect to Google consent
//! GET  /auth/google/callback   - Handle Google callback
//!
//! # Dashboards (HTML)
//! GET  /account                - Profile (customer)
//! GET  /account/orders         - Order history
//! GET  /cashier                - Order queue (staff)
//! GET  /admin                  - Counters (admin)
//!
//! # JSON API
//! GET  /api/cart                            - Cart summary
//! GET  /api/products                        - Product listing
//! GET  /api/products/{id}                   - Product detail
//! GET  /api/categories                      - Categories
//! GET  /api/vouchers                        - Vouchers for the customer
//! POST /api/voice/command                   - Voice transcript (rate limited)
//! GET  /api/account                         - Current profile
//! GET  /api/account/orders                  - Order history
//! GET  /api/account/orders/{id}             - Order detail
//! POST /api/account/orders/{id}/cancel      - Cancel an order
//! GET  /api/cashier/orders                  - Order queue (?status, ?date)
//! POST /api/cashier/orders/{id}/status      - Status transition
//! POST /api/cashier/orders/{id}/payment     - Confirm payment
//! GET  /api/cashier/reports/daily           - Daily report (?date)
//! GET  /api/admin/stats                     - Dashboard counters
//! GET|POST /api/admin/products              - Products
//! PUT|DELETE /api/admin/products/{id}
//! GET  /api/admin/users                     - Accounts
//! PUT  /api/admin/users/{id}/role
//! DELETE /api/admin/users/{id}
//! GET|POST /api/admin/vouchers              - Vouchers
//! PUT|DELETE /api/admin/vouchers/{id}
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod cashier;
pub mod checkout;
pub mod pages;
pub mod products;
pub mod voice;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::middleware::{auth_rate_limiter, voice_rate_limiter};
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the session database and the backend API.
/// Returns 503 Service Unavailable if either is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (db_ok, backend_ok) = tokio::join!(
        crate::db::ping(state.pool()),
        state.backend().is_healthy()
    );
    if db_ok && backend_ok {
        StatusCode::OK
    } else {
        tracing::warn!(db_ok, backend_ok, "Readiness check failed");
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/google/login", get(auth::google_login))
        .route("/google/callback", get(auth::google_callback))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/voucher", post(cart::apply_voucher))
        .route("/voucher/remove", post(cart::remove_voucher))
}

/// Create the customer account API router.
pub fn account_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::profile))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
        .route("/orders/{id}/cancel", post(account::cancel_order))
}

/// Create the cashier API router.
pub fn cashier_api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(cashier::orders))
        .route("/orders/{id}/status", post(cashier::update_status))
        .route("/orders/{id}/payment", post(cashier::confirm_payment))
        .route("/reports/daily", get(cashier::daily_report))
}

/// Create the admin API router.
pub fn admin_api_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route(
            "/products",
            get(admin::products).post(admin::create_product),
        )
        .route(
            "/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/users", get(admin::users))
        .route("/users/{id}/role", put(admin::update_user_role))
        .route("/users/{id}", axum::routing::delete(admin::delete_user))
        .route(
            "/vouchers",
            get(admin::vouchers).post(admin::create_voucher),
        )
        .route(
            "/vouchers/{id}",
            put(admin::update_voucher).delete(admin::delete_voucher),
        )
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    let voice = Router::new()
        .route("/command", post(voice::command))
        .layer(voice_rate_limiter());

    Router::new()
        .route("/cart", get(cart::summary))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
        .route("/vouchers", get(products::vouchers))
        .nest("/voice", voice)
        .nest("/account", account_api_routes())
        .nest("/cashier", cashier_api_routes())
        .nest("/admin", admin_api_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Pages
        .route("/", get(pages::home))
        .route("/menu", get(pages::menu))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .route(
            "/checkout",
            get(checkout::show).post(checkout::place_order),
        )
        // Auth routes
        .nest("/auth", auth_routes())
        // Dashboards
        .route("/account", get(account::index_page))
        .route("/account/orders", get(account::orders_page))
        .route("/cashier", get(cashier::dashboard))
        .route("/admin", get(admin::dashboard))
        // JSON API
        .nest("/api", api_routes())
}
