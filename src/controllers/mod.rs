pub mod accesses;
pub mod checkout;
pub mod error;
pub mod events;
pub mod lists;
pub mod payments;
pub mod sessions;

use axum::Router;
use std::sync::Arc;

pub use error::AppError;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(events::routes())
        .merge(checkout::routes())
        .merge(sessions::routes())
        .merge(payments::routes())
        .merge(lists::routes())
        .merge(accesses::routes())
}
