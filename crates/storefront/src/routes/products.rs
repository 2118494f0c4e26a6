//! Catalog JSON handlers.
//!
//! Thin pass-through to the backend catalog; listings without a search term
//! and single products come from the cache.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use juicequ_core::{CategoryId, ProductId};

use crate::backend::{Category, Product, ProductPage, ProductQuery, ProductSort, Voucher};
use crate::error::Result;
use crate::middleware::{RequireAuth, expire_on_unauthorized};
use crate::state::AppState;

/// Largest page a visitor may request.
const MAX_PAGE_SIZE: u32 = 50;

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
    pub sort: Option<ProductSort>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ListQuery> for ProductQuery {
    fn from(query: ListQuery) -> Self {
        Self {
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            category_id: query.category_id,
            sort: query.sort,
            page: query.page.map(|p| p.max(1)),
            page_size: query.page_size.map(|s| s.clamp(1, MAX_PAGE_SIZE)),
        }
    }
}

/// List products.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductPage>> {
    let page = state
        .backend()
        .list_products(&ProductQuery::from(query))
        .await?;
    Ok(Json(page))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    Ok(Json(state.backend().get_product(id).await?))
}

/// Menu categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.backend().list_categories().await?))
}

/// Vouchers offered to the signed-in customer.
#[instrument(skip(state, session, auth))]
pub async fn vouchers(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
) -> Result<Json<Vec<Voucher>>> {
    let vouchers = expire_on_unauthorized(
        &session,
        state.backend().list_vouchers(&auth.token).await,
    )
    .await?;
    Ok(Json(vouchers))
}
