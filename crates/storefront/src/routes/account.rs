//! Customer account handlers.
//!
//! All routes require authentication. Data comes straight from the backend
//! with the visitor's token; a rejected token signs the visitor out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::{info, instrument};

use juicequ_core::{OrderId, Price};

use crate::backend::{Order, User};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAuth, expire_on_unauthorized};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub status: String,
    pub payment_status: String,
    pub items: String,
    pub total: String,
    pub placed_at: String,
    pub cancellable: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number.clone(),
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            items: order
                .items
                .iter()
                .map(|item| {
                    format!(
                        "{}x {} ({})",
                        item.quantity,
                        item.product_name,
                        item.size.as_str()
                    )
                })
                .collect::<Vec<_>>()
                .join(", "),
            total: Price::idr(order.total).display(),
            placed_at: order.created_at.format("%d %b %Y %H:%M").to_string(),
            cancellable: order.status.is_cancellable(),
        }
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub profile: User,
    pub user: Option<CurrentUser>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub user: Option<CurrentUser>,
}

/// Display the account overview.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn index_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Response> {
    let profile = expire_on_unauthorized(&session, state.backend().me(&auth.token).await).await?;
    Ok(AccountTemplate {
        profile,
        user: Some(auth.user),
    }
    .into_response())
}

/// Display the order history.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn orders_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Response> {
    let orders =
        expire_on_unauthorized(&session, state.backend().list_orders(&auth.token).await).await?;
    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        user: Some(auth.user),
    }
    .into_response())
}

/// Current profile, fresh from the backend.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<User>> {
    let user = expire_on_unauthorized(&session, state.backend().me(&auth.token).await).await?;
    Ok(Json(user))
}

/// Order history.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders =
        expire_on_unauthorized(&session, state.backend().list_orders(&auth.token).await).await?;
    Ok(Json(orders))
}

/// One order.
#[instrument(skip(state, session, auth))]
pub async fn order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order =
        expire_on_unauthorized(&session, state.backend().get_order(id, &auth.token).await).await?;
    Ok(Json(order))
}

/// Cancel an order that has not started preparation.
///
/// The status is checked locally first so an obviously late request never
/// reaches the backend.
#[instrument(skip(state, session, auth))]
pub async fn cancel_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let current =
        expire_on_unauthorized(&session, state.backend().get_order(id, &auth.token).await).await?;
    if !current.status.is_cancellable() {
        return Err(AppError::BadRequest(format!(
            "Order {} is {} and can no longer be cancelled",
            current.order_number,
            current.status.as_str()
        )));
    }

    let order =
        expire_on_unauthorized(&session, state.backend().cancel_order(id, &auth.token).await)
            .await?;
    info!(order_id = %id, "Order cancelled by customer");
    Ok(Json(order))
}
