pub mod api;
pub mod maps;

pub use api::ApiClient;
