//! URL lists: slug-addressed, shareable lists of URLs behind a small JSON API.

pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod slug;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use model::{NewUrl, UrlEntry, UrlList};
pub use routes::{app, common_routes, list_routes};
pub use service::ListService;
pub use settings::Settings;
pub use state::AppState;
pub use store::{
    connect_pool, ensure_database_exists, ensure_schema, ListStore, MemoryListStore, PgListStore,
};
