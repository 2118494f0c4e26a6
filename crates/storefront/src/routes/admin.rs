//! Admin dashboard handlers.
//!
//! Admin only. Inputs get a quick local sanity check before the backend, which
//! remains the authority, sees them.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use juicequ_core::{Price, ProductId, UserId, UserRole, VoucherId};

use crate::backend::{
    DashboardStats, DiscountKind, Product, ProductInput, User, Voucher, VoucherInput,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, expire_on_unauthorized};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin.html")]
pub struct AdminDashboardTemplate {
    pub stats: DashboardStats,
    pub revenue_today: String,
    pub revenue_month: String,
    pub user: Option<CurrentUser>,
}

/// Role change body.
#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: UserRole,
}

fn validate_product(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if input.price <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Product price must be above zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_voucher(input: &VoucherInput) -> Result<()> {
    if input.code.trim().is_empty() {
        return Err(AppError::BadRequest("Voucher code is required".to_string()));
    }
    if input.discount_value <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Discount must be above zero".to_string(),
        ));
    }
    if input.discount_type == DiscountKind::Percentage
        && input.discount_value > Decimal::ONE_HUNDRED
    {
        return Err(AppError::BadRequest(
            "Percentage discount cannot exceed 100".to_string(),
        ));
    }
    Ok(())
}

/// Display the admin dashboard.
#[instrument(skip_all, fields(user_id = %auth.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Response> {
    let stats =
        expire_on_unauthorized(&session, state.backend().dashboard_stats(&auth.token).await)
            .await?;
    Ok(AdminDashboardTemplate {
        revenue_today: Price::idr(stats.revenue_today).display(),
        revenue_month: Price::idr(stats.revenue_month).display(),
        stats,
        user: Some(auth.user),
    }
    .into_response())
}

/// Dashboard counters.
#[instrument(skip_all)]
pub async fn stats(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<DashboardStats>> {
    let stats =
        expire_on_unauthorized(&session, state.backend().dashboard_stats(&auth.token).await)
            .await?;
    Ok(Json(stats))
}

// =============================================================================
// Products
// =============================================================================

/// Every product, available or not.
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let products =
        expire_on_unauthorized(&session, state.backend().admin_products(&auth.token).await)
            .await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state, session, auth, input))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_product(&input)?;
    let product = expire_on_unauthorized(
        &session,
        state.backend().create_product(&input, &auth.token).await,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product.
#[instrument(skip(state, session, auth, input))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    validate_product(&input)?;
    let product = expire_on_unauthorized(
        &session,
        state.backend().update_product(id, &input, &auth.token).await,
    )
    .await?;
    Ok(Json(product))
}

/// Delete a product.
#[instrument(skip(state, session, auth))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    expire_on_unauthorized(
        &session,
        state.backend().delete_product(id, &auth.token).await,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Users
// =============================================================================

/// Every account.
#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<Vec<User>>> {
    let users =
        expire_on_unauthorized(&session, state.backend().list_users(&auth.token).await).await?;
    Ok(Json(users))
}

/// Change an account's role. Admins cannot change their own.
#[instrument(skip(state, session, auth, change), fields(role = %change.role))]
pub async fn update_user_role(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<UserId>,
    Json(change): Json<RoleChange>,
) -> Result<Json<User>> {
    if id == auth.user.id {
        return Err(AppError::BadRequest(
            "You cannot change your own role".to_string(),
        ));
    }
    let user = expire_on_unauthorized(
        &session,
        state
            .backend()
            .update_user_role(id, change.role, &auth.token)
            .await,
    )
    .await?;
    info!(user_id = %id, role = %change.role, admin = %auth.user.id, "User role changed");
    Ok(Json(user))
}

/// Delete an account.
#[instrument(skip(state, session, auth))]
pub async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    if id == auth.user.id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }
    expire_on_unauthorized(&session, state.backend().delete_user(id, &auth.token).await).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Vouchers
// =============================================================================

/// Every voucher.
#[instrument(skip_all)]
pub async fn vouchers(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
) -> Result<Json<Vec<Voucher>>> {
    let vouchers =
        expire_on_unauthorized(&session, state.backend().admin_vouchers(&auth.token).await)
            .await?;
    Ok(Json(vouchers))
}

/// Create a voucher.
#[instrument(skip(state, session, auth, input))]
pub async fn create_voucher(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Json(input): Json<VoucherInput>,
) -> Result<(StatusCode, Json<Voucher>)> {
    validate_voucher(&input)?;
    let voucher = expire_on_unauthorized(
        &session,
        state.backend().create_voucher(&input, &auth.token).await,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(voucher)))
}

/// Replace a voucher.
#[instrument(skip(state, session, auth, input))]
pub async fn update_voucher(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<VoucherId>,
    Json(input): Json<VoucherInput>,
) -> Result<Json<Voucher>> {
    validate_voucher(&input)?;
    let voucher = expire_on_unauthorized(
        &session,
        state.backend().update_voucher(id, &input, &auth.token).await,
    )
    .await?;
    Ok(Json(voucher))
}

/// Delete a voucher.
#[instrument(skip(state, session, auth))]
pub async fn delete_voucher(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(auth): RequireAdmin,
    Path(id): Path<VoucherId>,
) -> Result<StatusCode> {
    expire_on_unauthorized(
        &session,
        state.backend().delete_voucher(id, &auth.token).await,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            description: None,
            price: Decimal::new(price, 0),
            category_id: None,
            image_url: None,
            is_available: true,
            stock: None,
        }
    }

    fn voucher(kind: DiscountKind, value: i64) -> VoucherInput {
        VoucherInput {
            code: "SEGAR".to_string(),
            description: None,
            discount_type: kind,
            discount_value: Decimal::new(value, 0),
            min_purchase: None,
            max_discount: None,
            valid_until: None,
            usage_limit: None,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product("Mango Blast", 25_000)).is_ok());
        assert!(validate_product(&product("  ", 25_000)).is_err());
        assert!(validate_product(&product("Mango Blast", 0)).is_err());
    }

    #[test]
    fn test_validate_voucher() {
        assert!(validate_voucher(&voucher(DiscountKind::Percentage, 10)).is_ok());
        assert!(validate_voucher(&voucher(DiscountKind::Percentage, 150)).is_err());
        assert!(validate_voucher(&voucher(DiscountKind::Fixed, 150_000)).is_ok());
        assert!(validate_voucher(&voucher(DiscountKind::Fixed, 0)).is_err());
    }
}
