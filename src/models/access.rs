use serde::{Deserialize, Serialize};
use validator::Validate;

/// Выданный доступ (entrada) на позицию каталога.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    pub id: String,
    pub catalog_item_id: String,
    pub owner_email: String,
    #[serde(default)]
    pub seat_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignAccessRequest {
    #[validate(length(min = 1))]
    pub catalog_item_id: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(range(min = 1, max = 50))]
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransferAccessRequest {
    #[validate(length(min = 1))]
    pub access_id: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
}
