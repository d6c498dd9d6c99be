use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::AppError;
use super::sessions::claim_session;
use crate::checkout::PaymentPlan;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/sessions/{id}/pay", post(pay))
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PayResponse {
    /// Итог ноль: доступы выданы сразу.
    #[serde(rename_all = "camelCase")]
    Free { access_ids: Vec<String> },
    /// Нужно перейти на страницу платёжного шлюза.
    #[serde(rename_all = "camelCase")]
    Paid { preference_id: String, init_point: String },
}

/// POST /api/sessions/{id}/pay
///
/// Нулевой итог оформляется через free-checkout, иначе создаётся
/// платёжная preference.
pub async fn pay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PayResponse>, AppError> {
    let (handle, _in_flight) = claim_session(&state, &id).await?;
    let (plan, client, scope) = {
        let mut session = handle.lock().await;
        session.touch();
        (session.payment_plan()?, session.client(&state.api), session.scope().clone())
    };

    let response = match plan {
        PaymentPlan::Free(req) => {
            let resp = scope.run(client.free_checkout(&req)).await?;
            if !resp.success {
                let message = resp
                    .message
                    .unwrap_or_else(|| "No se pudo completar la compra".to_string());
                return Err(AppError::new(StatusCode::CONFLICT, "CHECKOUT_REJECTED", message));
            }
            tracing::info!(session_id = %id, accesses = resp.access_ids.len(), "free checkout completed");
            PayResponse::Free { access_ids: resp.access_ids }
        }
        PaymentPlan::Paid(req) => {
            let pref = scope.run(client.create_preference(&req)).await?;
            tracing::info!(session_id = %id, preference_id = %pref.id, "payment preference created");
            PayResponse::Paid {
                preference_id: pref.id,
                init_point: pref.init_point,
            }
        }
    };

    Ok(Json(response))
}
