//! api.rs
//!
//! Типизированный клиент upstream REST API.
//!
//! - Базовый URL и режим credentials берутся из [`ApiConfig`].
//! - Сессионная cookie пользователя пробрасывается только в режиме `include`.
//! - Один запрос на одно действие: без повторов и без дедупликации.
//! - Ответ декодируется в строгие DTO; несовпадение формы - сразу
//!   [`ApiError::Decode`].

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::{ApiConfig, CredentialsMode};
use crate::error::ApiError;
use crate::models::access::{Access, AssignAccessRequest, TransferAccessRequest};
use crate::models::event::CreateEventRequest;
use crate::models::list::{CreateListRequest, GuestInput, GuestList, ListQuery, UpdateListRequest};
use crate::models::payment::{
    CreatePreferenceRequest, FreeCheckoutRequest, FreeCheckoutResponse, PreferenceResponse,
    ReserveSeatsRequest, ReserveSeatsResponse,
};
use crate::models::rrpp::{ResolveRrppRequest, RrppPromo};
use crate::models::{CatalogItem, Event, UserProfile};

/// Тело ошибки upstream: `{"message": "..."}` или `{"error": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_default()
}

/// Клиент upstream API. Клонируется дёшево (внутри `reqwest::Client`).
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialsMode,
    session_cookie: Option<String>,
}

impl ApiClient {
    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
            session_cookie: None,
        })
    }

    /// Копия клиента, действующая от имени пользователя с этой cookie.
    pub fn with_session(&self, cookie: Option<String>) -> Self {
        Self {
            session_cookie: cookie,
            ..self.clone()
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);

        if self.credentials == CredentialsMode::Include {
            if let Some(cookie) = &self.session_cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let body = Self::check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_no_content(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Проверка статуса и маппинг бизнес-ошибок.
    async fn check_status(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        warn!(status = status.as_u16(), path = %url, message = %message, "upstream request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(url),
            StatusCode::CONFLICT => ApiError::Conflict(message),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::NumberedSectorList,
            _ => ApiError::Http { status: status.as_u16(), message },
        })
    }

    /// Выполняет запрос, прерывая его при отмене `token`.
    pub async fn cancellable<T, F>(token: &CancellationToken, operation: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        tokio::select! {
            _ = token.cancelled() => {
                debug!("request cancelled by owning view");
                Err(ApiError::Cancelled)
            }
            result = operation => result,
        }
    }

    // ========== Events ==========

    pub async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let mut events: Vec<Event> = self.send(self.request(Method::GET, "/events")).await?;
        for event in &mut events {
            event.derive_sector_visibility();
        }
        Ok(events)
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Event, ApiError> {
        let mut event: Event = self
            .send(self.request(Method::GET, &format!("/events/{}", event_id)))
            .await?;
        event.derive_sector_visibility();
        debug!(event_id, items = event.catalog_items.len(), "event loaded");
        Ok(event)
    }

    pub async fn create_event(&self, req: &CreateEventRequest) -> Result<Event, ApiError> {
        req.validate()?;
        let event: Event = self.send(self.request(Method::POST, "/events").json(req)).await?;
        info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Резерв мест. Решение о доступности принимает только сервер.
    pub async fn reserve_seats(
        &self,
        event_id: &str,
        item_id: &str,
        seats: &[String],
    ) -> Result<ReserveSeatsResponse, ApiError> {
        let path = format!("/events/{}/catalog/{}/seats/reserve", event_id, item_id);
        let body = ReserveSeatsRequest { seats: seats.to_vec() };
        info!(event_id, item_id, seats = seats.len(), "reserving seats");
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    // ========== Payments ==========

    pub async fn create_preference(&self, req: &CreatePreferenceRequest) -> Result<PreferenceResponse, ApiError> {
        info!(event_id = %req.event_id, total = req.total, "creating payment preference");
        self.send(self.request(Method::POST, "/payments/create-preference").json(req))
            .await
    }

    pub async fn free_checkout(&self, req: &FreeCheckoutRequest) -> Result<FreeCheckoutResponse, ApiError> {
        info!(event_id = %req.event_id, "free checkout");
        self.send(self.request(Method::POST, "/payments/free-checkout").json(req))
            .await
    }

    // ========== Accesses ==========

    pub async fn assign_access(&self, req: &AssignAccessRequest) -> Result<Vec<Access>, ApiError> {
        req.validate()?;
        self.send(self.request(Method::POST, "/accesses/assign").json(req)).await
    }

    pub async fn transfer_access(&self, req: &TransferAccessRequest) -> Result<Access, ApiError> {
        req.validate()?;
        self.send(self.request(Method::POST, "/accesses/transfer").json(req)).await
    }

    pub async fn access_catalog_item(&self, access_id: &str) -> Result<CatalogItem, ApiError> {
        let path = format!("/accesses/{}/catalog-item", access_id);
        self.send(self.request(Method::GET, &path)).await
    }

    // ========== RRPP ==========

    pub async fn resolve_rrpp(&self, req: &ResolveRrppRequest) -> Result<RrppPromo, ApiError> {
        req.validate()?;
        self.send(self.request(Method::POST, "/rrpp/resolve-active").json(req))
            .await
    }

    // ========== User ==========

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    // ========== Guest lists ==========

    pub async fn list_guest_lists(&self, event_id: &str) -> Result<Vec<GuestList>, ApiError> {
        let query = ListQuery { event_id: event_id.to_string() };
        self.send(self.request(Method::GET, "/lists").query(&query)).await
    }

    pub async fn get_guest_list(&self, list_id: &str) -> Result<GuestList, ApiError> {
        self.send(self.request(Method::GET, &format!("/lists/{}", list_id)))
            .await
    }

    pub async fn create_guest_list(&self, req: &CreateListRequest) -> Result<GuestList, ApiError> {
        req.validate()?;
        self.send(self.request(Method::POST, "/lists").json(req)).await
    }

    pub async fn update_guest_list(&self, list_id: &str, req: &UpdateListRequest) -> Result<GuestList, ApiError> {
        req.validate()?;
        let path = format!("/lists/{}", list_id);
        self.send(self.request(Method::PATCH, &path).json(req)).await
    }

    pub async fn delete_guest_list(&self, list_id: &str) -> Result<(), ApiError> {
        self.send_no_content(self.request(Method::DELETE, &format!("/lists/{}", list_id)))
            .await
    }

    pub async fn add_guest(&self, list_id: &str, guest: &GuestInput) -> Result<GuestList, ApiError> {
        guest.validate()?;
        let path = format!("/lists/{}/guests", list_id);
        self.send(self.request(Method::POST, &path).json(guest)).await
    }

    pub async fn remove_guest(&self, list_id: &str, guest_id: &str) -> Result<(), ApiError> {
        let path = format!("/lists/{}/guests/{}", list_id, guest_id);
        self.send_no_content(self.request(Method::DELETE, &path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(error_message(r#"{"message":"ya existe"}"#), "ya existe");
        assert_eq!(error_message(r#"{"error":"bad"}"#), "bad");
        assert_eq!(error_message("<html>"), "");
    }

    #[test]
    fn base_url_is_normalised() {
        let config = ApiConfig {
            base_url: "http://api.local/".into(),
            credentials: CredentialsMode::Omit,
            timeout_seconds: 5,
        };
        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://api.local");
    }
}
