//! Persistence of lists and their URL entries.
//!
//! `ListStore` is the seam between the service and the backing store. Slugs
//! arrive already resolved and inputs already validated; stores only enforce
//! what the schema enforces (unique slugs, existing parent lists).

mod memory;
mod postgres;
mod schema;

pub use memory::MemoryListStore;
pub use postgres::PgListStore;
pub use schema::{connect_pool, ensure_database_exists, ensure_schema};

use crate::error::AppError;
use crate::model::{NewUrl, UrlEntry, UrlList};
use async_trait::async_trait;

#[async_trait]
pub trait ListStore: Send + Sync {
    /// Insert an empty list. A taken slug is `AppError::Conflict`.
    async fn create_list(&self, custom_url: &str) -> Result<UrlList, AppError>;

    /// The list with its entries by ascending position, or `None`.
    async fn get_list(&self, custom_url: &str) -> Result<Option<UrlList>, AppError>;

    /// Every list, newest first, each with its entries by ascending position.
    async fn get_all_lists(&self) -> Result<Vec<UrlList>, AppError>;

    /// Append at `max(position) + 1` (0 for an empty list). A missing list is
    /// `AppError::InvalidReference`.
    async fn add_url_to_list(&self, new_url: &NewUrl) -> Result<UrlEntry, AppError>;

    /// Replace the URL text only, refreshing `updated_at`. `None` if absent.
    async fn update_url(&self, url_id: i64, new_url: &str) -> Result<Option<UrlEntry>, AppError>;

    /// Returns whether an entry was removed.
    async fn delete_url(&self, url_id: i64) -> Result<bool, AppError>;

    /// Removes the list and all of its entries. Returns whether the list existed.
    async fn delete_list(&self, custom_url: &str) -> Result<bool, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
