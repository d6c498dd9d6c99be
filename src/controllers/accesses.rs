use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::AppError;
use crate::middleware::SessionCookie;
use crate::models::access::{Access, AssignAccessRequest, TransferAccessRequest};
use crate::models::CatalogItem;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accesses/assign", post(assign))
        .route("/accesses/transfer", post(transfer))
        .route("/accesses/{id}/catalog-item", get(catalog_item))
}

/// POST /api/accesses/assign
pub async fn assign(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<AssignAccessRequest>,
) -> Result<Json<Value>, AppError> {
    let accesses = state.api.with_session(cookie.into_inner()).assign_access(&req).await?;
    tracing::info!(item_id = %req.catalog_item_id, count = accesses.len(), "accesses assigned");
    Ok(Json(json!({ "success": true, "accesses": accesses })))
}

/// POST /api/accesses/transfer
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<TransferAccessRequest>,
) -> Result<Json<Access>, AppError> {
    let access = state.api.with_session(cookie.into_inner()).transfer_access(&req).await?;
    Ok(Json(access))
}

/// GET /api/accesses/{id}/catalog-item
pub async fn catalog_item(
    State(state): State<Arc<AppState>>,
    Path(access_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<CatalogItem>, AppError> {
    let item = state
        .api
        .with_session(cookie.into_inner())
        .access_catalog_item(&access_id)
        .await?;
    Ok(Json(item))
}
