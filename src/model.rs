//! List and URL entry types as stored and as serialized to clients.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One URL inside a list. `position` orders entries within the list; values are
/// append-only and gaps left by deletions are never refilled.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct UrlEntry {
    pub id: i64,
    pub list_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}

/// A slug-addressed list with its entries sorted by ascending position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlList {
    pub id: i64,
    pub custom_url: String,
    pub created_at: DateTime<Utc>,
    pub urls: Vec<UrlEntry>,
}

/// Input of an append. Fields are validated before they reach a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUrl {
    pub list_id: i64,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl NewUrl {
    pub fn new(list_id: i64, url: impl Into<String>) -> Self {
        Self {
            list_id,
            url: url.into(),
            title: None,
            description: None,
        }
    }
}
