//! sessions.rs
//!
//! Сессия выбора мест на стороне BFF.
//!
//! - Создание сессии под событие и снимок её состояния.
//! - Выбор сектора, переключение мест, постраничный вывод мест.
//! - Количество позиций, промокод, «Continuar» с резервом на сервере.
//!
//! Блокировка сессии не держится во время запросов в upstream.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::error::AppError;
use crate::checkout::CheckoutTotals;
use crate::error::ApiError;
use crate::middleware::SessionCookie;
use crate::models::rrpp::ResolveRrppRequest;
use crate::selection::{ContinueOutcome, Redirect, SeatPager, SelectionError, ToggleOutcome};
use crate::session::{InFlight, Session, SessionHandle, SessionSnapshot, SeatsPage};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(close_session))
        .route("/sessions/{id}/sector", put(select_sector))
        .route("/sessions/{id}/seats/toggle", post(toggle_seat))
        .route("/sessions/{id}/seats", get(list_seats))
        .route("/sessions/{id}/items/{item}", put(set_quantity))
        .route("/sessions/{id}/promo", post(apply_promo).delete(clear_promo))
        .route("/sessions/{id}/continue", post(continue_flow))
        .route("/sessions/{id}/refresh", post(refresh_event))
        .route("/sessions/{id}/toasts", delete(dismiss_toasts))
        // POST /sessions/{id}/pay - в payments.rs
}

pub(super) async fn find_session(state: &AppState, id: &Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::not_found("La sesión no existe o expiró"))
}

/// Для обработчиков, которые отпускают блокировку на время запроса в upstream.
pub(super) async fn claim_session(state: &AppState, id: &Uuid) -> Result<(SessionHandle, InFlight), AppError> {
    state
        .sessions
        .claim(id)
        .await
        .ok_or_else(|| AppError::not_found("La sesión no existe o expiró"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub event_id: String,
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSnapshot>), AppError> {
    let cookie = cookie.into_inner();
    let client = state.api.with_session(cookie.clone());

    let (event, user) = futures::join!(client.get_event(&req.event_id), client.current_user());
    let event = event?;
    let user = match user {
        Ok(profile) => Some(profile),
        Err(ApiError::Unauthorized) => None,
        Err(e) => {
            tracing::warn!(error = %e, "could not load user profile, continuing anonymously");
            None
        }
    };

    let mut session = Session::new(event, cookie);
    session.set_user(user);
    let (_, handle) = state.sessions.insert(session).await;

    let snapshot = handle.lock().await.snapshot();
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();
    Ok(Json(session.snapshot()))
}

/// DELETE /api/sessions/{id}
pub async fn close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("La sesión no existe o expiró"))
    }
}

/// POST /api/sessions/{id}/refresh
///
/// Перечитывает событие с сервера (свежие статусы мест).
/// Во время резерва мест отвечает 409.
pub async fn refresh_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let (handle, _in_flight) = claim_session(&state, &id).await?;
    let (client, scope, event_id) = {
        let session = handle.lock().await;
        if session.reservation_in_flight() {
            return Err(SelectionError::InvalidTransition("a reservation is in flight").into());
        }
        (session.client(&state.api), session.scope().clone(), session.event().id.clone())
    };

    let event = scope.run(client.get_event(&event_id)).await?;
    state.layouts.invalidate(&event_id).await;

    let mut session = handle.lock().await;
    session.touch();
    session.replace_event(event)?;
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSectorRequest {
    /// `null` снимает выбор.
    pub sector_id: Option<String>,
}

/// PUT /api/sessions/{id}/sector
pub async fn select_sector(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectSectorRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();

    match req.sector_id.as_deref() {
        Some(sector_id) => {
            session.select_sector(sector_id)?;
        }
        None => session.clear_sector()?,
    }
    Ok(Json(session.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct ToggleSeatRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSeatResponse {
    pub outcome: ToggleOutcome,
    pub selected_seats: Vec<String>,
}

/// POST /api/sessions/{id}/seats/toggle
pub async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ToggleSeatRequest>,
) -> Result<Json<ToggleSeatResponse>, AppError> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let outcome = session.toggle_seat(req.code.trim())?;
    Ok(Json(ToggleSeatResponse {
        outcome,
        selected_seats: session.selection().selected().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SeatsQuery {
    pub page: Option<usize>,
    pub narrow: Option<bool>,
}

/// GET /api/sessions/{id}/seats?page=&narrow=
pub async fn list_seats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(params): Query<SeatsQuery>,
) -> Result<Json<SeatsPage>, AppError> {
    let page_size = if params.narrow.unwrap_or(false) {
        state.config.checkout.seat_page_size_narrow
    } else {
        state.config.checkout.seat_page_size_wide
    };

    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();
    Ok(Json(session.seats_view(SeatPager::new(page_size), params.page.unwrap_or(0))?))
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: u32,
}

/// PUT /api/sessions/{id}/items/{item}
pub async fn set_quantity(
    State(state): State<Arc<AppState>>,
    Path((id, item_id)): Path<(Uuid, String)>,
    Json(req): Json<QuantityRequest>,
) -> Result<Json<CheckoutTotals>, AppError> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();
    Ok(Json(session.set_quantity(&item_id, req.quantity)?))
}

#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    pub code: String,
}

/// POST /api/sessions/{id}/promo
pub async fn apply_promo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PromoRequest>,
) -> Result<Json<CheckoutTotals>, AppError> {
    let (handle, _in_flight) = claim_session(&state, &id).await?;
    let (client, scope, resolve) = {
        let session = handle.lock().await;
        let resolve = ResolveRrppRequest {
            event_id: session.event().id.clone(),
            code: req.code.trim().to_string(),
        };
        (session.client(&state.api), session.scope().clone(), resolve)
    };
    resolve.validate().map_err(ApiError::from)?;

    let promo = scope.run(client.resolve_rrpp(&resolve)).await?;

    let mut session = handle.lock().await;
    session.touch();
    Ok(Json(session.apply_promo(promo)?))
}

/// DELETE /api/sessions/{id}/promo
pub async fn clear_promo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutTotals>, AppError> {
    let handle = find_session(&state, &id).await?;
    let mut session = handle.lock().await;
    session.touch();
    session.clear_promo();
    Ok(Json(session.checkout().totals()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponse {
    pub success: bool,
    pub redirect: Redirect,
}

/// POST /api/sessions/{id}/continue
///
/// Ненумерованный сектор: сразу редирект в checkout. Нумерованный: резерв
/// выбранных мест; при отказе сервера сессия возвращается к выбору мест.
pub async fn continue_flow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContinueResponse>, AppError> {
    let (handle, _in_flight) = claim_session(&state, &id).await?;

    let (request, client, scope) = {
        let mut session = handle.lock().await;
        session.touch();
        match session.continue_flow()? {
            ContinueOutcome::Redirect(redirect) => {
                return Ok(Json(ContinueResponse { success: true, redirect }));
            }
            ContinueOutcome::Reserve(request) => {
                (request, session.client(&state.api), session.scope().clone())
            }
        }
    };

    let result = scope
        .run(client.reserve_seats(&request.event_id, &request.item_id, &request.seats))
        .await;

    let mut session = handle.lock().await;
    let redirect = session.complete_reservation(result)?;
    Ok(Json(ContinueResponse { success: true, redirect }))
}

/// DELETE /api/sessions/{id}/toasts
pub async fn dismiss_toasts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let handle = find_session(&state, &id).await?;
    handle.lock().await.take_toasts();
    Ok(StatusCode::NO_CONTENT)
}
