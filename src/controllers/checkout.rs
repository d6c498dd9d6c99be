use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use super::error::AppError;
use crate::checkout::CheckoutState;
use crate::error::ApiError;
use crate::middleware::SessionCookie;
use crate::models::rrpp::ResolveRrppRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/checkout/quote", post(quote))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    #[validate(length(min = 1))]
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[validate(length(min = 1))]
    pub event_id: String,
    #[validate(nested)]
    pub items: Vec<QuoteItem>,
    #[validate(length(min = 3, max = 32, message = "Código inválido"))]
    pub promo_code: Option<String>,
}

/// POST /api/checkout/quote
///
/// Пересчёт корзины без сессии: событие и промокод запрашиваются
/// параллельно, дальше всё считается локально.
pub async fn quote(
    State(state): State<Arc<AppState>>,
    cookie: SessionCookie,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<Value>, AppError> {
    req.validate().map_err(ApiError::from)?;
    let client = state.api.with_session(cookie.into_inner());

    let resolve = async {
        match &req.promo_code {
            Some(code) => {
                let promo_req = ResolveRrppRequest {
                    event_id: req.event_id.clone(),
                    code: code.clone(),
                };
                client.resolve_rrpp(&promo_req).await.map(Some)
            }
            None => Ok(None),
        }
    };
    let (event, promo) = futures::try_join!(client.get_event(&req.event_id), resolve)?;

    let mut checkout = CheckoutState::for_event(&event);
    for item in &req.items {
        checkout.quote_quantity(&item.item_id, item.quantity)?;
    }
    if let Some(promo) = promo {
        checkout.apply_promo(promo)?;
    }

    Ok(Json(json!({ "success": true, "checkout": checkout })))
}
