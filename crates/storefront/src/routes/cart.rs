//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart lives in the visitor session; the backend only sees it at
//! checkout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use juicequ_core::{DrinkSize, ProductId};

use crate::cart::{self, AppliedVoucher, CartItem, CartSummary};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// HTMX event fired whenever the cart changes.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub size: DrinkSize,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: DrinkSize,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub size: DrinkSize,
}

/// Voucher form data.
#[derive(Debug, Deserialize)]
pub struct VoucherForm {
    pub code: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartSummary,
    pub user: Option<CurrentUser>,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartSummary,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Items fragment plus the `cart-updated` trigger.
fn items_fragment(cart: &cart::Cart) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartSummary::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, OptionalAuth(auth): OptionalAuth) -> impl IntoResponse {
    let cart = cart::store::load(&session).await;

    CartShowTemplate {
        cart: CartSummary::from(&cart),
        user: auth.map(|a| a.user),
        error: None,
    }
}

/// Add item to cart (HTMX).
///
/// Looks the product up in the catalog so the name and price come from the
/// backend, not the form. Returns the count badge and fires `cart-updated`.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state.backend().get_product(form.product_id).await?;
    if !product.is_orderable() {
        return Err(AppError::BadRequest(format!(
            "{} is not available right now",
            product.name
        )));
    }

    let mut cart = cart::store::load(&session).await;
    cart.add(CartItem {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price_for(form.size),
        quantity: form.quantity.unwrap_or(1),
        size: form.size,
        image_url: product.image_url.clone(),
    })?;
    cart::store::save(&session, &cart).await?;

    let product_id = product.id.to_string();
    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[("product_id", product_id.as_str()), ("size", form.size.as_str())]),
    );

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let mut cart = cart::store::load(&session).await;
    cart.update_quantity(form.product_id, form.size, form.quantity)?;
    cart::store::save(&session, &cart).await?;
    Ok(items_fragment(&cart))
}

/// Remove item from cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let mut cart = cart::store::load(&session).await;
    cart.remove(form.product_id, form.size)?;
    cart::store::save(&session, &cart).await?;
    Ok(items_fragment(&cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    cart::store::clear(&session).await?;
    Ok(items_fragment(&cart::Cart::default()))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = cart::store::load(&session).await;
    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Validate a voucher against the backend and apply it (HTMX).
#[instrument(skip(state, session, auth))]
pub async fn apply_voucher(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Form(form): Form<VoucherForm>,
) -> Result<Response> {
    let code = form.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::BadRequest("Please enter a voucher code".to_string()));
    }

    let mut cart = cart::store::load(&session).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest(
            "Add something to your cart before using a voucher".to_string(),
        ));
    }

    let validation = state
        .backend()
        .validate_voucher(&code, cart.subtotal(), auth.as_ref().map(|a| &a.token))
        .await?;
    if !validation.valid {
        return Err(AppError::BadRequest(
            validation
                .message
                .unwrap_or_else(|| "This voucher cannot be used".to_string()),
        ));
    }

    // Without the voucher body only the quoted amount is known
    let applied = validation.voucher.as_ref().map_or_else(
        || AppliedVoucher {
            code: code.clone(),
            kind: crate::backend::DiscountKind::Fixed,
            value: validation.discount_amount,
            min_purchase: None,
            max_discount: None,
        },
        AppliedVoucher::from,
    );
    cart.apply_voucher(applied);
    cart::store::save(&session, &cart).await?;

    add_breadcrumb("cart", "Applied voucher", Some(&[("code", code.as_str())]));
    Ok(items_fragment(&cart))
}

/// Remove the applied voucher (HTMX).
#[instrument(skip(session))]
pub async fn remove_voucher(session: Session) -> Result<Response> {
    let mut cart = cart::store::load(&session).await;
    cart.remove_voucher();
    cart::store::save(&session, &cart).await?;
    Ok(items_fragment(&cart))
}

/// Cart summary as JSON.
#[instrument(skip(session))]
pub async fn summary(session: Session) -> Json<CartSummary> {
    let cart = cart::store::load(&session).await;
    Json(CartSummary::from(&cart))
}
