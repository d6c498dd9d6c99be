pub mod cache;
pub mod checkout;
pub mod config;
pub mod controllers;
pub mod dashboard;
pub mod error;
pub mod layout;
pub mod middleware;
pub mod models;
pub mod selection;
pub mod services;
pub mod session;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::cache::LayoutCache;
use crate::error::ApiError;
use crate::services::ApiClient;
use crate::session::SessionRegistry;

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub api: ApiClient,
    pub layouts: LayoutCache,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, ApiError> {
        let api = ApiClient::from_config(&config.api)?;

        Ok(Arc::new(Self {
            config,
            api,
            layouts: LayoutCache::new(),
            sessions: SessionRegistry::new(),
        }))
    }
}

/// Полный роутер BFF.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Ticketera BFF v0.1" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
