//! Cashier endpoints: order queue, payments and the daily report.

use chrono::NaiveDate;
use reqwest::Method;
use tracing::instrument;

use juicequ_core::{OrderId, OrderStatus};

use super::types::{
    AccessToken, ConfirmPaymentRequest, DailyReport, Order, OrderQuery, UpdateOrderStatusRequest,
};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Orders in the cashier queue, optionally filtered.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-staff tokens.
    #[instrument(skip(self, token))]
    pub async fn cashier_orders(
        &self,
        query: &OrderQuery,
        token: &AccessToken,
    ) -> Result<Vec<Order>, ApiError> {
        self.get_with_query("cashier/orders", query, Some(token))
            .await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the backend refuses the transition.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        token: &AccessToken,
    ) -> Result<Order, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("cashier/orders/{id}/status"),
            &UpdateOrderStatusRequest { status },
            Some(token),
        )
        .await
    }

    /// Record a payment taken at the counter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the amount does not cover the total.
    #[instrument(skip(self, request, token), fields(order_id = %id))]
    pub async fn confirm_payment(
        &self,
        id: OrderId,
        request: &ConfirmPaymentRequest,
        token: &AccessToken,
    ) -> Result<Order, ApiError> {
        self.send_json(
            Method::POST,
            &format!("cashier/orders/{id}/payment"),
            request,
            Some(token),
        )
        .await
    }

    /// Sales summary for `date` (today when `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn daily_report(
        &self,
        date: Option<NaiveDate>,
        token: &AccessToken,
    ) -> Result<DailyReport, ApiError> {
        let query: Vec<(&str, String)> = date
            .map(|d| ("date", d.format("%Y-%m-%d").to_string()))
            .into_iter()
            .collect();
        self.get_with_query("cashier/reports/daily", &query, Some(token))
            .await
    }
}
