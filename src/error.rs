//! error.rs
//!
//! Ошибки работы с upstream REST API.
//!
//! Категории:
//! 1.  Сеть/HTTP: общий или присланный сервером текст, без повторов.
//! 2.  Валидация: ловится до отправки, сообщения по полям.
//! 3.  Бизнес-конфликты: 422 (список привязан к нумерованному сектору),
//!     409 (дубликат).
//!
//! Гонка за место сюда не относится: её видно только по телу ответа
//! резерва, разбирается в [`crate::selection`].

use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("authentication required")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("list is associated with a numbered sector")]
    NumberedSectorList,
    #[error("upstream returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Текст для пользователя (toast).
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "No se pudo conectar con el servidor".to_string(),
            ApiError::Validation(_) => "Revisá los datos del formulario".to_string(),
            ApiError::Unauthorized => "Tenés que iniciar sesión".to_string(),
            ApiError::NotFound(_) => "No encontramos lo que buscabas".to_string(),
            ApiError::Conflict(msg) if !msg.is_empty() => msg.clone(),
            ApiError::Conflict(_) => "El recurso ya existe".to_string(),
            ApiError::NumberedSectorList => {
                "La lista está asociada a un sector numerado".to_string()
            }
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Http { .. } | ApiError::Decode(_) => "Ocurrió un error inesperado".to_string(),
            ApiError::Cancelled => "La operación fue cancelada".to_string(),
        }
    }

    /// HTTP-статус, с которым ошибку отдаёт BFF.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network(_) | ApiError::Decode(_) => 502,
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::NumberedSectorList => 422,
            ApiError::Http { status, .. } => *status,
            ApiError::Cancelled => 499,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "UPSTREAM_UNAVAILABLE",
            ApiError::Validation(_) => "VALIDATION",
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::NumberedSectorList => "LIST_NUMBERED_SECTOR",
            ApiError::Http { .. } => "UPSTREAM_ERROR",
            ApiError::Decode(_) => "UPSTREAM_SHAPE",
            ApiError::Cancelled => "CANCELLED",
        }
    }
}

/// Ошибки валидации по полям: поле -> список сообщений.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
