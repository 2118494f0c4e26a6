//! Wire types for the JuiceQu REST backend.
//!
//! These mirror the backend's JSON contracts. Fields the storefront does not
//! need are ignored on decode; optional fields default so that older backend
//! versions still deserialize.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use juicequ_core::{
    CategoryId, DrinkSize, Email, OrderId, OrderItemId, OrderStatus, PaymentMethod,
    PaymentStatus, Price, ProductId, UserId, UserRole, VoucherId,
};

// =============================================================================
// Auth
// =============================================================================

/// Bearer token issued by the backend.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token, for the `Authorization` header or session storage.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// A backend user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Registration request body.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
}

/// Successful login / registration / OAuth exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

/// Google OAuth authorize URL issued by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthAuthorizeResponse {
    #[serde(alias = "url")]
    pub authorization_url: String,
}

/// Google OAuth code exchange request.
#[derive(Debug, Serialize)]
pub struct OAuthCallbackRequest<'a> {
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

// =============================================================================
// Catalog
// =============================================================================

/// A juice on the menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Base (medium) price.
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub stock: Option<u32>,
    /// Explicit prices per size, overriding the default adjustments.
    #[serde(default)]
    pub size_prices: BTreeMap<DrinkSize, Decimal>,
    #[serde(default)]
    pub average_rating: Option<f32>,
    #[serde(default)]
    pub order_count: u32,
}

impl Product {
    /// Unit price for a size.
    ///
    /// Uses the backend's explicit size price when present, otherwise the
    /// base price plus [`DrinkSize::price_adjustment`], never below zero.
    #[must_use]
    pub fn price_for(&self, size: DrinkSize) -> Decimal {
        self.size_prices.get(&size).copied().unwrap_or_else(|| {
            (self.price + size.price_adjustment()).max(Decimal::ZERO)
        })
    }

    /// Whether the product can currently be ordered.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.is_available && self.stock.is_none_or(|stock| stock > 0)
    }

    /// Formatted base price.
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::idr(self.price).display()
    }
}

/// A page of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(alias = "products")]
    pub items: Vec<Product>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Product ordering understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    Popular,
}

impl ProductSort {
    /// Query-string value.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::Popular => "popular",
        }
    }
}

/// Product listing filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<ProductSort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl ProductQuery {
    /// A free-text search query.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    /// Whether the query carries a free-text search term.
    #[must_use]
    pub fn is_search(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A menu category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_count: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub voucher_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(default)]
    pub size: DrinkSize,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Order creation request built from the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One requested line; prices are decided by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub size: DrinkSize,
}

/// Cashier order queue filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Order status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Payment confirmation at the counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_method: PaymentMethod,
    pub amount_paid: Decimal,
}

// =============================================================================
// Vouchers
// =============================================================================

/// How a voucher discount is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` percent of the subtotal.
    Percentage,
    /// A flat Rupiah amount.
    #[serde(alias = "fixed_amount")]
    Fixed,
}

/// A discount voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: VoucherId,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountKind,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_purchase: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Voucher validation request.
#[derive(Debug, Serialize)]
pub struct VoucherValidationRequest<'a> {
    pub code: &'a str,
    pub subtotal: Decimal,
}

/// Voucher validation result.
#[derive(Debug, Clone, Deserialize)]
pub struct VoucherValidation {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub voucher: Option<Voucher>,
}

// =============================================================================
// Admin & Reports
// =============================================================================

/// Admin product create/update body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub stock: Option<u32>,
}

/// Admin voucher create/update body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherInput {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountKind,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_purchase: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Role change body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

/// Daily sales report for the cashier dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub total_orders: u32,
    #[serde(default)]
    pub completed_orders: u32,
    #[serde(default)]
    pub cancelled_orders: u32,
    pub revenue: Decimal,
    #[serde(default)]
    pub average_order_value: Decimal,
    #[serde(default)]
    pub top_products: Vec<TopProduct>,
    #[serde(default)]
    pub payment_breakdown: BTreeMap<String, Decimal>,
}

/// Best seller entry of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
}

/// Admin dashboard counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u32,
    #[serde(default)]
    pub total_products: u32,
    #[serde(default)]
    pub total_orders: u32,
    #[serde(default)]
    pub pending_orders: u32,
    #[serde(default)]
    pub orders_today: u32,
    #[serde(default)]
    pub revenue_today: Decimal,
    #[serde(default)]
    pub revenue_month: Decimal,
}

// =============================================================================
// AI Chat
// =============================================================================

/// Chat request sent to the AI endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub context: ChatContext,
}

/// Context attached to a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
    /// Where the message came from (`voice`).
    pub source: &'static str,
    pub cart: Vec<ChatCartLine>,
}

/// Cart line as seen by the assistant.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub size: DrinkSize,
}

/// Chat reply from the AI endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(alias = "response", alias = "message")]
    pub reply: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub actions: Vec<AssistantAction>,
}

/// Structured action the assistant wants applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantAction {
    AddToCart {
        product_id: ProductId,
        #[serde(default = "default_quantity")]
        quantity: u32,
        #[serde(default)]
        size: DrinkSize,
    },
    RemoveFromCart {
        product_id: ProductId,
        #[serde(default)]
        size: Option<DrinkSize>,
    },
    ClearCart,
    Navigate {
        path: String,
    },
    #[serde(other)]
    Unsupported,
}

const fn default_true() -> bool {
    true
}

const fn default_quantity() -> u32 {
    1
}

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    20
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: i64) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Jus Alpukat".to_string(),
            description: None,
            price: Decimal::new(price, 0),
            category_id: None,
            category_name: None,
            image_url: None,
            is_available: true,
            stock: None,
            size_prices: BTreeMap::new(),
            average_rating: None,
            order_count: 0,
        }
    }

    #[test]
    fn test_price_for_uses_adjustments() {
        let avocado = product(18_000);
        assert_eq!(avocado.price_for(DrinkSize::Small), Decimal::new(15_000, 0));
        assert_eq!(avocado.price_for(DrinkSize::Medium), Decimal::new(18_000, 0));
        assert_eq!(avocado.price_for(DrinkSize::Large), Decimal::new(23_000, 0));
    }

    #[test]
    fn test_price_for_prefers_explicit_size_price_and_clamps() {
        let mut cheap = product(2_000);
        assert_eq!(cheap.price_for(DrinkSize::Small), Decimal::ZERO);

        cheap.size_prices.insert(DrinkSize::Large, Decimal::new(9_000, 0));
        assert_eq!(cheap.price_for(DrinkSize::Large), Decimal::new(9_000, 0));
    }

    #[test]
    fn test_orderable_respects_stock() {
        let mut p = product(10_000);
        assert!(p.is_orderable());
        p.stock = Some(0);
        assert!(!p.is_orderable());
        p.stock = Some(3);
        p.is_available = false;
        assert!(!p.is_orderable());
    }

    #[test]
    fn test_product_decodes_numeric_prices_and_size_map() {
        let json = r#"{
            "id": 3, "name": "Jus Mangga", "price": 15000.0,
            "size_prices": {"large": "21000"}
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.price, Decimal::new(15_000, 0));
        assert_eq!(p.price_for(DrinkSize::Large), Decimal::new(21_000, 0));
        assert!(p.is_available);
    }

    #[test]
    fn test_assistant_actions_decode() {
        let json = r#"[
            {"type": "add_to_cart", "product_id": 4, "quantity": 2, "size": "large"},
            {"type": "add_to_cart", "product_id": 5},
            {"type": "clear_cart"},
            {"type": "navigate", "path": "/menu"},
            {"type": "play_music"}
        ]"#;
        let actions: Vec<AssistantAction> = serde_json::from_str(json).unwrap();
        assert_eq!(
            actions,
            vec![
                AssistantAction::AddToCart {
                    product_id: ProductId::new(4),
                    quantity: 2,
                    size: DrinkSize::Large,
                },
                AssistantAction::AddToCart {
                    product_id: ProductId::new(5),
                    quantity: 1,
                    size: DrinkSize::Medium,
                },
                AssistantAction::ClearCart,
                AssistantAction::Navigate {
                    path: "/menu".to_string()
                },
                AssistantAction::Unsupported,
            ]
        );
    }

    #[test]
    fn test_chat_response_accepts_response_alias() {
        let json = r#"{"response": "Siap, jus jeruk ditambahkan!", "session_id": "abc"}"#;
        let reply: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.reply, "Siap, jus jeruk ditambahkan!");
        assert!(reply.actions.is_empty());
    }

    #[test]
    fn test_product_query_serializes_only_set_fields() {
        let query = ProductQuery {
            sort: Some(ProductSort::PriceAsc),
            ..ProductQuery::default()
        };
        assert_eq!(
            serde_json::to_string(&query).unwrap(),
            r#"{"sort":"price_asc"}"#
        );
        assert!(!query.is_search());
        assert!(ProductQuery::search("jeruk").is_search());
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secret.part");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(token.expose(), "eyJhbGciOi.secret.part");
    }
}
