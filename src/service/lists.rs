//! ListService: list and entry operations over a `ListStore`.

use super::validation::{RequestValidator, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH};
use crate::error::AppError;
use crate::model::{NewUrl, UrlEntry, UrlList};
use crate::slug::{generate_slug, validate_slug};
use crate::store::ListStore;
use std::sync::Arc;

/// Attempts at a fresh generated slug before giving up on collisions.
const GENERATED_SLUG_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn ListStore>,
}

impl ListService {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ListStore> {
        &self.store
    }

    /// Create an empty list. A blank or missing slug is generated; a chosen one
    /// that is taken is `Conflict`.
    pub async fn create_list(&self, custom_url: Option<&str>) -> Result<UrlList, AppError> {
        if let Some(slug) = custom_url.map(str::trim).filter(|s| !s.is_empty()) {
            let list = self.store.create_list(validate_slug(slug)?).await?;
            tracing::info!(list_id = list.id, custom_url = %list.custom_url, "list created");
            return Ok(list);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.store.create_list(&generate_slug()).await {
                Ok(list) => {
                    tracing::info!(list_id = list.id, custom_url = %list.custom_url, "list created");
                    return Ok(list);
                }
                Err(AppError::Conflict(msg)) if attempt < GENERATED_SLUG_ATTEMPTS => {
                    tracing::warn!(attempt, %msg, "generated slug collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_list(&self, custom_url: &str) -> Result<UrlList, AppError> {
        self.store
            .get_list(custom_url)
            .await?
            .ok_or_else(|| AppError::NotFound("List not found".into()))
    }

    pub async fn get_all_lists(&self) -> Result<Vec<UrlList>, AppError> {
        self.store.get_all_lists().await
    }

    pub async fn add_url_to_list(
        &self,
        list_id: i64,
        url: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<UrlEntry, AppError> {
        let new_url = NewUrl {
            list_id,
            url: RequestValidator::url("url", url)?,
            title: RequestValidator::optional_text("title", title, MAX_TITLE_LENGTH)?,
            description: RequestValidator::optional_text(
                "description",
                description,
                MAX_DESCRIPTION_LENGTH,
            )?,
        };
        let entry = self.store.add_url_to_list(&new_url).await?;
        tracing::info!(list_id, url_id = entry.id, position = entry.position, "url added");
        Ok(entry)
    }

    pub async fn update_url(&self, url_id: i64, new_url: &str) -> Result<UrlEntry, AppError> {
        let new_url = RequestValidator::url("newUrl", new_url)?;
        let entry = self
            .store
            .update_url(url_id, &new_url)
            .await?
            .ok_or_else(|| AppError::NotFound("URL not found".into()))?;
        tracing::info!(url_id, "url updated");
        Ok(entry)
    }

    /// Idempotent: an unknown id is not an error.
    pub async fn delete_url(&self, url_id: i64) -> Result<(), AppError> {
        let removed = self.store.delete_url(url_id).await?;
        tracing::info!(url_id, removed, "url delete");
        Ok(())
    }

    /// Idempotent; removes the list's entries with it.
    pub async fn delete_list(&self, custom_url: &str) -> Result<(), AppError> {
        let removed = self.store.delete_list(custom_url).await?;
        tracing::info!(custom_url, removed, "list delete");
        Ok(())
    }
}
