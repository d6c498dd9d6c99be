use serde::{Deserialize, Serialize};
use validator::Validate;

/// Список гостей (lista de invitados) события.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestList {
    pub id: String,
    pub name: String,
    pub event_id: String,
    pub capacity: u32,
    #[serde(default)]
    pub sector_id: Option<String>,
    #[serde(default)]
    pub guests: Vec<Guest>,
}

impl GuestList {
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.guests.len() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub dni: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub event_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListRequest {
    #[validate(length(min = 1, max = 80, message = "El nombre de la lista es obligatorio"))]
    pub name: String,
    #[validate(length(min = 1))]
    pub event_id: String,
    #[validate(range(min = 1, max = 10000, message = "La capacidad debe ser mayor a cero"))]
    pub capacity: u32,
    pub sector_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 10000))]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    #[validate(length(min = 2, max = 120, message = "Nombre inválido"))]
    pub name: String,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 10, message = "DNI inválido"))]
    pub dni: Option<String>,
}
