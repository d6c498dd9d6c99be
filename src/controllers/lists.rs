use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::AppError;
use crate::middleware::SessionCookie;
use crate::models::list::{CreateListRequest, GuestInput, GuestList, ListQuery, UpdateListRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lists", get(list_lists).post(create_list))
        .route("/lists/{id}", get(get_list).patch(update_list).delete(delete_list))
        .route("/lists/{id}/guests", post(add_guest))
        .route("/lists/{id}/guests/{guest}", delete(remove_guest))
}

/// GET /api/lists?eventId=
pub async fn list_lists(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let lists = state
        .api
        .with_session(cookie.into_inner())
        .list_guest_lists(&query.event_id)
        .await?;
    Ok(Json(json!({ "success": true, "lists": lists })))
}

/// GET /api/lists/{id}
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<GuestList>, AppError> {
    let list = state.api.with_session(cookie.into_inner()).get_guest_list(&list_id).await?;
    Ok(Json(list))
}

/// POST /api/lists
///
/// Ошибки полей возвращаются в `fields` ещё до запроса в upstream.
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<GuestList>), AppError> {
    let list = state.api.with_session(cookie.into_inner()).create_guest_list(&req).await?;
    tracing::info!(list_id = %list.id, event_id = %list.event_id, "guest list created");
    Ok((StatusCode::CREATED, Json(list)))
}

/// PATCH /api/lists/{id}
pub async fn update_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    cookie: SessionCookie,
    Json(req): Json<UpdateListRequest>,
) -> Result<Json<GuestList>, AppError> {
    let list = state
        .api
        .with_session(cookie.into_inner())
        .update_guest_list(&list_id, &req)
        .await?;
    Ok(Json(list))
}

/// DELETE /api/lists/{id}
///
/// 422 от upstream: список привязан к нумерованному сектору.
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    cookie: SessionCookie,
) -> Result<StatusCode, AppError> {
    state.api.with_session(cookie.into_inner()).delete_guest_list(&list_id).await?;
    tracing::info!(list_id = %list_id, "guest list deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/lists/{id}/guests
pub async fn add_guest(
    State(state): State<Arc<AppState>>,
    Path(list_id): Path<String>,
    cookie: SessionCookie,
    Json(guest): Json<GuestInput>,
) -> Result<Json<Value>, AppError> {
    let list = state.api.with_session(cookie.into_inner()).add_guest(&list_id, &guest).await?;
    Ok(Json(json!({
        "success": true,
        "remaining": list.remaining(),
        "list": list,
    })))
}

/// DELETE /api/lists/{id}/guests/{guest}
pub async fn remove_guest(
    State(state): State<Arc<AppState>>,
    Path((list_id, guest_id)): Path<(String, String)>,
    cookie: SessionCookie,
) -> Result<StatusCode, AppError> {
    state
        .api
        .with_session(cookie.into_inner())
        .remove_guest(&list_id, &guest_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
