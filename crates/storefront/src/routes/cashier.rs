//! Cashier dashboard handlers.
//!
//! Staff only (cashier or admin).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, info, instrument, warn};

use juicequ_core::{OrderId, OrderStatus, PaymentStatus, Price};

use crate::backend::{ConfirmPaymentRequest, DailyReport, Order, OrderQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireStaff, expire_on_unauthorized};
use crate::models::CurrentUser;
use crate::routes::account::OrderView;
use crate::state::AppState;

/// Cashier dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/cashier.html")]
pub struct CashierDashboardTemplate {
    pub queue: Vec<OrderView>,
    pub orders_today: u32,
    pub revenue_today: String,
    pub user: Option<CurrentUser>,
}

/// Status change body.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// Report query parameters.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub date: Option<NaiveDate>,
}

/// Reject a transition the order lifecycle does not allow.
fn check_transition(order: &Order, next: OrderStatus) -> Result<()> {
    if order.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Order {} cannot move from {} to {}",
            order.order_number,
            order.status.as_str(),
            next.as_str()
        )))
    }
}

/// Display the open order queue and today's totals.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(auth): RequireStaff,
) -> Result<Response> {
    let backend = state.backend();
    let orders = expire_on_unauthorized(
        &session,
        backend.cashier_orders(&OrderQuery::default(), &auth.token).await,
    )
    .await?;

    let (orders_today, revenue_today) = match backend.daily_report(None, &auth.token).await {
        Ok(report) => (report.total_orders, Price::idr(report.revenue).display()),
        Err(e) => {
            warn!("Failed to fetch daily report: {e}");
            (0, "-".to_string())
        }
    };

    Ok(CashierDashboardTemplate {
        queue: orders
            .iter()
            .filter(|o| !o.status.is_terminal())
            .map(OrderView::from)
            .collect(),
        orders_today,
        revenue_today,
        user: Some(auth.user),
    }
    .into_response())
}

/// Order queue, optionally filtered by status or date.
#[instrument(skip(state, session, auth))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(auth): RequireStaff,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>> {
    let orders = expire_on_unauthorized(
        &session,
        state.backend().cashier_orders(&query, &auth.token).await,
    )
    .await?;
    Ok(Json(orders))
}

/// Move an order along its lifecycle.
#[instrument(skip(state, session, auth, change), fields(status = %change.status))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<OrderId>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Order>> {
    let backend = state.backend();
    let queue = expire_on_unauthorized(
        &session,
        backend.cashier_orders(&OrderQuery::default(), &auth.token).await,
    )
    .await?;
    // The queue is one page; orders beyond it are left to the backend to judge
    match queue.iter().find(|o| o.id == id) {
        Some(current) => check_transition(current, change.status)?,
        None => debug!(order_id = %id, "Order not in the open queue, deferring to backend"),
    }

    let order = expire_on_unauthorized(
        &session,
        backend
            .update_order_status(id, change.status, &auth.token)
            .await,
    )
    .await?;
    info!(order_id = %id, status = %change.status, cashier = %auth.user.id, "Order status changed");
    Ok(Json(order))
}

/// Record a counter payment.
#[instrument(skip(state, session, auth, request))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(auth): RequireStaff,
    Path(id): Path<OrderId>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<Order>> {
    let order = expire_on_unauthorized(
        &session,
        state
            .backend()
            .confirm_payment(id, &request, &auth.token)
            .await,
    )
    .await?;
    if order.payment_status == PaymentStatus::Paid {
        info!(order_id = %id, method = ?request.payment_method, "Payment confirmed");
    }
    Ok(Json(order))
}

/// Daily sales report.
#[instrument(skip(state, session, auth))]
pub async fn daily_report(
    State(state): State<AppState>,
    session: Session,
    RequireStaff(auth): RequireStaff,
    Query(query): Query<ReportQuery>,
) -> Result<Json<DailyReport>> {
    let report = expire_on_unauthorized(
        &session,
        state.backend().daily_report(query.date, &auth.token).await,
    )
    .await?;
    Ok(Json(report))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use juicequ_core::PaymentMethod;
    use rust_decimal::Decimal;

    use super::*;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(1),
            order_number: "JQ-0001".to_string(),
            status,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Cash,
            items: Vec::new(),
            subtotal: Decimal::new(25_000, 0),
            discount: Decimal::ZERO,
            total: Decimal::new(25_000, 0),
            voucher_code: None,
            notes: None,
            customer_name: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_transition() {
        assert!(check_transition(&order(OrderStatus::Pending), OrderStatus::Confirmed).is_ok());
        assert!(check_transition(&order(OrderStatus::Preparing), OrderStatus::Ready).is_ok());

        let err = check_transition(&order(OrderStatus::Completed), OrderStatus::Preparing)
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        assert!(err.public_message().contains("completed"));
    }
}
