use serde::{Deserialize, Serialize};

// --- Резерв нумерованных мест ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSeatsRequest {
    pub seats: Vec<String>,
}

/// Ответ на резерв. Гонку за место сервер сообщает не статусом HTTP,
/// а полем `status` != "success".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveSeatsResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReserveSeatsResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// --- Оплата ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    pub catalog_item_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    pub event_id: String,
    pub items: Vec<PaymentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrpp_code: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeCheckoutRequest {
    pub event_id: String,
    pub items: Vec<PaymentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrpp_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeCheckoutResponse {
    pub success: bool,
    #[serde(default)]
    pub access_ids: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}
