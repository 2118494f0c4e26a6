//! Admin endpoints: dashboard, products, users and vouchers.
//!
//! Product mutations drop the catalog cache so the menu reflects them
//! immediately.

use reqwest::Method;
use tracing::{info, instrument};

use juicequ_core::{ProductId, UserId, UserRole, VoucherId};

use super::types::{
    AccessToken, DashboardStats, Product, ProductInput, UpdateRoleRequest, User, Voucher,
    VoucherInput,
};
use super::{ApiError, BackendClient};

impl BackendClient {
    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for non-admin tokens.
    #[instrument(skip(self, token))]
    pub async fn dashboard_stats(&self, token: &AccessToken) -> Result<DashboardStats, ApiError> {
        self.get("admin/stats", Some(token)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product, including unavailable ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_products(&self, token: &AccessToken) -> Result<Vec<Product>, ApiError> {
        self.get("admin/products", Some(token)).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for invalid input.
    #[instrument(skip(self, input, token), fields(name = %input.name))]
    pub async fn create_product(
        &self,
        input: &ProductInput,
        token: &AccessToken,
    ) -> Result<Product, ApiError> {
        let product: Product = self
            .send_json(Method::POST, "admin/products", input, Some(token))
            .await?;
        self.invalidate_catalog().await;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self, input, token), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
        token: &AccessToken,
    ) -> Result<Product, ApiError> {
        let product: Product = self
            .send_json(
                Method::PUT,
                &format!("admin/products/{id}"),
                input,
                Some(token),
            )
            .await?;
        self.invalidate_catalog().await;
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if open orders still reference it.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId, token: &AccessToken) -> Result<(), ApiError> {
        self.delete(&format!("admin/products/{id}"), Some(token))
            .await?;
        self.invalidate_catalog().await;
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn list_users(&self, token: &AccessToken) -> Result<Vec<User>, ApiError> {
        self.get("admin/users", Some(token)).await
    }

    /// Change an account's role.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the user does not exist.
    #[instrument(skip(self, token), fields(user_id = %id, role = %role))]
    pub async fn update_user_role(
        &self,
        id: UserId,
        role: UserRole,
        token: &AccessToken,
    ) -> Result<User, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("admin/users/{id}/role"),
            &UpdateRoleRequest { role },
            Some(token),
        )
        .await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the user does not exist.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId, token: &AccessToken) -> Result<(), ApiError> {
        self.delete(&format!("admin/users/{id}"), Some(token)).await
    }

    // =========================================================================
    // Vouchers
    // =========================================================================

    /// Every voucher, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn admin_vouchers(&self, token: &AccessToken) -> Result<Vec<Voucher>, ApiError> {
        self.get("admin/vouchers", Some(token)).await
    }

    /// Create a voucher.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Conflict` if the code is taken.
    #[instrument(skip(self, input, token), fields(code = %input.code))]
    pub async fn create_voucher(
        &self,
        input: &VoucherInput,
        token: &AccessToken,
    ) -> Result<Voucher, ApiError> {
        self.send_json(Method::POST, "admin/vouchers", input, Some(token))
            .await
    }

    /// Replace a voucher.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the voucher does not exist.
    #[instrument(skip(self, input, token), fields(voucher_id = %id))]
    pub async fn update_voucher(
        &self,
        id: VoucherId,
        input: &VoucherInput,
        token: &AccessToken,
    ) -> Result<Voucher, ApiError> {
        self.send_json(
            Method::PUT,
            &format!("admin/vouchers/{id}"),
            input,
            Some(token),
        )
        .await
    }

    /// Delete a voucher.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the voucher does not exist.
    #[instrument(skip(self, token), fields(voucher_id = %id))]
    pub async fn delete_voucher(&self, id: VoucherId, token: &AccessToken) -> Result<(), ApiError> {
        self.delete(&format!("admin/vouchers/{id}"), Some(token))
            .await
    }
}
