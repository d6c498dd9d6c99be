use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::selection::{NARROW_PAGE_SIZE, WIDE_PAGE_SIZE};

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub maps: MapsConfig,
    pub checkout: CheckoutConfig,
}

// Настройки BFF-сервера
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_json: bool,
    /// Через сколько секунд неактивности сессия выбора удаляется.
    pub session_idle_seconds: u64,
}

/// Режим передачи сессионной cookie в upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsMode {
    Include,
    Omit,
}

impl FromStr for CredentialsMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include" => Ok(CredentialsMode::Include),
            "omit" => Ok(CredentialsMode::Omit),
            other => Err(ConfigError::Invalid {
                key: "API_CREDENTIALS",
                value: other.to_string(),
            }),
        }
    }
}

// Настройки upstream REST API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub credentials: CredentialsMode,
    pub timeout_seconds: u64,
}

// Google Maps Embed API
#[derive(Debug, Clone, Deserialize)]
pub struct MapsConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    pub seat_page_size_wide: usize,
    pub seat_page_size_narrow: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

fn var_or(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = var_or(key, default);
    raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw })
}

/// В проде и на стейдже cookie сессии отправляется, локально нет.
fn default_credentials(environment: &str) -> &'static str {
    match environment {
        "production" | "staging" => "include",
        _ => "omit",
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = var_or("ENVIRONMENT", "development");
        let credentials = var_or("API_CREDENTIALS", default_credentials(&environment)).parse()?;

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_var("PORT", "8000")?,
                rust_log: var_or("RUST_LOG", "ticketera=debug,tower_http=debug"),
                log_json: var_or("LOG_FORMAT", "text") == "json",
                session_idle_seconds: parse_var("SESSION_IDLE_SECONDS", "1800")?,
                environment,
            },
            api: ApiConfig {
                base_url: env::var("API_BASE_URL").map_err(|_| ConfigError::Missing("API_BASE_URL"))?,
                credentials,
                timeout_seconds: parse_var("API_TIMEOUT_SECONDS", "30")?,
            },
            maps: MapsConfig {
                api_key: env::var("GOOGLE_MAPS_API_KEY").ok().filter(|k| !k.is_empty()),
            },
            checkout: CheckoutConfig {
                seat_page_size_wide: parse_var("SEAT_PAGE_SIZE_WIDE", &WIDE_PAGE_SIZE.to_string())?,
                seat_page_size_narrow: parse_var("SEAT_PAGE_SIZE_NARROW", &NARROW_PAGE_SIZE.to_string())?,
            },
        })
    }

    /// Конфигурация по умолчанию с заданным upstream (тесты, локальный запуск).
    pub fn with_api_base(base_url: impl Into<String>) -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                environment: "development".to_string(),
                rust_log: "ticketera=debug".to_string(),
                log_json: false,
                session_idle_seconds: 1800,
            },
            api: ApiConfig {
                base_url: base_url.into(),
                credentials: CredentialsMode::Include,
                timeout_seconds: 30,
            },
            maps: MapsConfig { api_key: None },
            checkout: CheckoutConfig {
                seat_page_size_wide: WIDE_PAGE_SIZE,
                seat_page_size_narrow: NARROW_PAGE_SIZE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_parse_case_insensitive() {
        assert_eq!("Include".parse::<CredentialsMode>().unwrap(), CredentialsMode::Include);
        assert_eq!(" omit ".parse::<CredentialsMode>().unwrap(), CredentialsMode::Omit);
        assert!("same-origin".parse::<CredentialsMode>().is_err());
    }

    #[test]
    fn credentials_default_per_environment() {
        assert_eq!(default_credentials("production"), "include");
        assert_eq!(default_credentials("staging"), "include");
        assert_eq!(default_credentials("development"), "omit");
    }
}
