use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRrppRequest {
    #[validate(length(min = 1))]
    pub event_id: String,
    #[validate(length(min = 3, max = 32, message = "Código inválido"))]
    pub code: String,
}

/// Промокод RRPP (промоутера), дающий скидку на checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RrppPromo {
    pub id: String,
    pub code: String,
    pub name: String,
    pub discount_percent: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}
