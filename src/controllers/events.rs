use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::AppError;
use crate::dashboard::{ClubDashboard, EventDashboard};
use crate::layout::Layout;
use crate::middleware::SessionCookie;
use crate::models::{CreateEventRequest, UserProfile};
use crate::services::{maps, ApiClient};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/layout", get(get_layout))
        .route("/events/{id}/dashboard", get(get_event_dashboard))
        .route("/events/{id}/map", get(get_map))
        .route("/clubs/{id}/dashboard", get(get_club_dashboard))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
) -> Result<Json<Value>, AppError> {
    let events = state.api.with_session(cookie.into_inner()).list_events().await?;

    Ok(Json(json!({
        "success": true,
        "count": events.len(),
        "events": events,
    })))
}

/// Панели и создание событий доступны только клубу и администратору.
async fn require_manager(client: &ApiClient) -> Result<UserProfile, AppError> {
    let user = client.current_user().await?;
    if !user.can_manage_events() {
        tracing::warn!(user_id = %user.id, role = ?user.role, "management endpoint denied");
        return Err(AppError::forbidden());
    }
    Ok(user)
}

/// POST /api/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let client = state.api.with_session(cookie.into_inner());
    let user = require_manager(&client).await?;

    let event = client.create_event(&req).await?;
    tracing::info!(event_id = %event.id, user_id = %user.id, "event created from dashboard");
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "event": event }))))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<Value>, AppError> {
    let event = state.api.with_session(cookie.into_inner()).get_event(&event_id).await?;
    Ok(Json(json!({ "success": true, "event": event })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub success: bool,
    pub event_id: String,
    /// Набор трибун не прошёл проверку ввода; раскладка всё равно строится.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    pub layout: Arc<Layout>,
}

/// GET /api/events/{id}/layout
///
/// Геометрия стадиона. Кешируется, пока у события не поменялись трибуны.
pub async fn get_layout(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<LayoutResponse>, AppError> {
    let event = state.api.with_session(cookie.into_inner()).get_event(&event_id).await?;

    let issue = event
        .stadium
        .as_ref()
        .and_then(|s| s.validate().err())
        .map(|e| {
            tracing::warn!(event_id = %event.id, error = %e, "stadium input is inconsistent");
            e.to_string()
        });

    let layout = state
        .layouts
        .layout_for(&event)
        .await
        .ok_or_else(|| AppError::not_found("El evento no tiene mapa de estadio"))?;

    Ok(Json(LayoutResponse {
        success: true,
        event_id: event.id,
        issue,
        layout,
    }))
}

/// GET /api/events/{id}/dashboard
///
/// Только для клуба и администратора.
pub async fn get_event_dashboard(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<EventDashboard>, AppError> {
    let client = state.api.with_session(cookie.into_inner());
    require_manager(&client).await?;

    let event = client.get_event(&event_id).await?;
    Ok(Json(EventDashboard::for_event(&event)))
}

/// GET /api/clubs/{id}/dashboard
pub async fn get_club_dashboard(
    State(state): State<Arc<AppState>>,
    Path(club_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<ClubDashboard>, AppError> {
    let client = state.api.with_session(cookie.into_inner());
    require_manager(&client).await?;

    let events = client.list_events().await?;
    Ok(Json(ClubDashboard::for_club(&club_id, &events)))
}

/// GET /api/events/{id}/map
pub async fn get_map(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
    cookie: SessionCookie,
) -> Result<Json<Value>, AppError> {
    let event = state.api.with_session(cookie.into_inner()).get_event(&event_id).await?;
    let embed_url = event
        .address
        .as_deref()
        .and_then(|address| maps::embed_url(&state.config.maps, address));

    Ok(Json(json!({
        "success": true,
        "address": event.address,
        "embedUrl": embed_url,
    })))
}
