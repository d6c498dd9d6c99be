use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;

use crate::checkout::CheckoutError;
use crate::error::{field_messages, ApiError};
use crate::selection::SelectionError;

/// Ошибка обработчика BFF: `{"success": false, "code", "message", "fields"}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), fields: None }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", "No tenés permisos para ver esto")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = self.code, message = %self.message, "request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), code = self.code, "request rejected");
        }

        let mut body = json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        });
        if let Some(fields) = self.fields {
            body["fields"] = json!(fields);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        let fields = match &e {
            ApiError::Validation(errors) => Some(field_messages(errors)),
            _ => None,
        };
        Self {
            status,
            code: e.code(),
            message: e.user_message(),
            fields,
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        let (status, code) = match &e {
            CheckoutError::UnknownItem(_) => (StatusCode::NOT_FOUND, "UNKNOWN_ITEM"),
            CheckoutError::LimitExceeded { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "LIMIT_EXCEEDED"),
            CheckoutError::OutOfStock { .. } => (StatusCode::CONFLICT, "OUT_OF_STOCK"),
            CheckoutError::InactivePromo(_) => (StatusCode::UNPROCESSABLE_ENTITY, "PROMO_INACTIVE"),
            CheckoutError::SeatsRequired(_) => (StatusCode::UNPROCESSABLE_ENTITY, "SEATS_REQUIRED"),
            CheckoutError::Empty => (StatusCode::BAD_REQUEST, "CHECKOUT_EMPTY"),
        };
        Self::new(status, code, e.user_message())
    }
}

impl From<SelectionError> for AppError {
    fn from(e: SelectionError) -> Self {
        let (status, code) = match e {
            SelectionError::Upstream(api) => return api.into(),
            SelectionError::Checkout(checkout) => return checkout.into(),
            SelectionError::NoStadium => (StatusCode::NOT_FOUND, "NO_STADIUM"),
            SelectionError::UnknownSector(_) => (StatusCode::NOT_FOUND, "UNKNOWN_SECTOR"),
            SelectionError::UnknownSeat(_) => (StatusCode::NOT_FOUND, "UNKNOWN_SEAT"),
            SelectionError::SectorNotForSale(_) => (StatusCode::UNPROCESSABLE_ENTITY, "SECTOR_NOT_FOR_SALE"),
            SelectionError::SeatUnavailable(_) => (StatusCode::CONFLICT, "SEAT_UNAVAILABLE"),
            SelectionError::EmptySelection => (StatusCode::BAD_REQUEST, "EMPTY_SELECTION"),
            SelectionError::InvalidTransition(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            SelectionError::SeatAlreadyReserved => (StatusCode::CONFLICT, "SEAT_TAKEN"),
        };
        Self::new(status, code, e.user_message())
    }
}
