//! Customer endpoints: orders and vouchers.

use reqwest::Method;
use rust_decimal::Decimal;
use tracing::instrument;

use juicequ_core::OrderId;

use super::types::{
    AccessToken, CreateOrderRequest, Order, Voucher, VoucherValidation, VoucherValidationRequest,
};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Place an order. Prices and discounts are recomputed by the backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if an item is unavailable or the
    /// voucher no longer applies.
    #[instrument(skip(self, request, token), fields(items = request.items.len()))]
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
        token: &AccessToken,
    ) -> Result<Order, ApiError> {
        self.send_json(Method::POST, "customer/orders", request, Some(token))
            .await
    }

    /// Order history of the current customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_orders(&self, token: &AccessToken) -> Result<Vec<Order>, ApiError> {
        self.get("customer/orders", Some(token)).await
    }

    /// A single order of the current customer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist or belongs to
    /// someone else.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId, token: &AccessToken) -> Result<Order, ApiError> {
        self.get(&format!("customer/orders/{id}"), Some(token))
            .await
    }

    /// Cancel an order that has not started preparation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` if the order can no longer be cancelled.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn cancel_order(&self, id: OrderId, token: &AccessToken) -> Result<Order, ApiError> {
        self.send_json(
            Method::POST,
            &format!("customer/orders/{id}/cancel"),
            &serde_json::json!({}),
            Some(token),
        )
        .await
    }

    /// Vouchers currently offered to the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_vouchers(&self, token: &AccessToken) -> Result<Vec<Voucher>, ApiError> {
        self.get("customer/vouchers", Some(token)).await
    }

    /// Check a voucher code against a cart subtotal.
    ///
    /// An invalid code is not an error: the result carries `valid: false` and
    /// the backend's reason.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn validate_voucher(
        &self,
        code: &str,
        subtotal: Decimal,
        token: Option<&AccessToken>,
    ) -> Result<VoucherValidation, ApiError> {
        self.send_json(
            Method::POST,
            "customer/vouchers/validate",
            &VoucherValidationRequest { code, subtotal },
            token,
        )
        .await
    }
}
