//! Checkout route handlers.
//!
//! The cart is turned into a backend order. Prices, stock and the voucher
//! are re-checked by the backend; the totals shown before this point are
//! estimates.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use juicequ_core::{PaymentMethod, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::backend::Order;
use crate::cart::{self, CartSummary};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, expire_on_unauthorized};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Longest accepted order note.
const MAX_NOTES_LENGTH: usize = 500;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub cart: CartSummary,
    pub user: Option<CurrentUser>,
}

/// Order placed template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order: Order,
    pub total_display: String,
    pub user: Option<CurrentUser>,
}

/// Review the cart before placing the order.
#[instrument(skip(session, auth))]
pub async fn show(session: Session, RequireAuth(auth): RequireAuth) -> impl IntoResponse {
    let cart = cart::store::load(&session).await;
    CheckoutTemplate {
        cart: CartSummary::from(&cart),
        user: Some(auth.user),
    }
}

/// Place the order and clear the cart.
#[instrument(skip(state, session, auth), fields(user_id = %auth.user.id))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = cart::store::load(&session).await;
    let notes = form
        .notes
        .map(|n| n.trim().chars().take(MAX_NOTES_LENGTH).collect::<String>());
    let request = cart
        .to_order_request(form.payment_method, notes)
        .ok_or_else(|| AppError::BadRequest("Your cart is empty".to_string()))?;

    let order = expire_on_unauthorized(
        &session,
        state.backend().create_order(&request, &auth.token).await,
    )
    .await?;

    cart::store::clear(&session).await?;
    info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_number", order.order_number.as_str())]),
    );

    Ok(ConfirmationTemplate {
        total_display: Price::idr(order.total).display(),
        order,
        user: Some(auth.user),
    }
    .into_response())
}
