use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;

/// Cookie пользователя из входящего запроса.
///
/// BFF не разбирает её содержимое: заголовок целиком уходит в upstream как
/// учётные данные сессии (если включён режим `include`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookie(pub Option<String>);

impl SessionCookie {
    pub fn into_inner(self) -> Option<String> {
        self.0
    }
}

impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let cookies: Vec<&str> = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect();

        if cookies.is_empty() {
            return Ok(SessionCookie(None));
        }
        Ok(SessionCookie(Some(cookies.join("; "))))
    }
}
