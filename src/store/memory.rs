//! In-process `ListStore` with the same ordering, error and cascade behavior as
//! the PostgreSQL store. Backs the HTTP tests and database-free local runs.

use super::ListStore;
use crate::error::AppError;
use crate::model::{NewUrl, UrlEntry, UrlList};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct ListRow {
    id: i64,
    custom_url: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    lists: Vec<ListRow>,
    urls: Vec<UrlEntry>,
    next_list_id: i64,
    next_url_id: i64,
}

impl Tables {
    fn assemble(&self, list: &ListRow) -> UrlList {
        let mut urls: Vec<UrlEntry> = self
            .urls
            .iter()
            .filter(|u| u.list_id == list.id)
            .cloned()
            .collect();
        urls.sort_by_key(|u| u.position);
        UrlList {
            id: list.id,
            custom_url: list.custom_url.clone(),
            created_at: list.created_at,
            urls,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryListStore {
    tables: Mutex<Tables>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListStore for MemoryListStore {
    async fn create_list(&self, custom_url: &str) -> Result<UrlList, AppError> {
        let mut t = self.tables.lock().await;
        if t.lists.iter().any(|l| l.custom_url == custom_url) {
            return Err(AppError::Conflict(format!("list '{}' already exists", custom_url)));
        }
        t.next_list_id += 1;
        let row = ListRow {
            id: t.next_list_id,
            custom_url: custom_url.to_string(),
            created_at: Utc::now(),
        };
        t.lists.push(row.clone());
        Ok(t.assemble(&row))
    }

    async fn get_list(&self, custom_url: &str) -> Result<Option<UrlList>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.lists
            .iter()
            .find(|l| l.custom_url == custom_url)
            .map(|l| t.assemble(l)))
    }

    async fn get_all_lists(&self) -> Result<Vec<UrlList>, AppError> {
        let t = self.tables.lock().await;
        let mut rows: Vec<&ListRow> = t.lists.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows.into_iter().map(|l| t.assemble(l)).collect())
    }

    async fn add_url_to_list(&self, new_url: &NewUrl) -> Result<UrlEntry, AppError> {
        let mut t = self.tables.lock().await;
        if !t.lists.iter().any(|l| l.id == new_url.list_id) {
            return Err(AppError::InvalidReference(format!(
                "list {} does not exist",
                new_url.list_id
            )));
        }
        let position = t
            .urls
            .iter()
            .filter(|u| u.list_id == new_url.list_id)
            .map(|u| u.position)
            .max()
            .unwrap_or(-1)
            + 1;
        t.next_url_id += 1;
        let entry = UrlEntry {
            id: t.next_url_id,
            list_id: new_url.list_id,
            url: new_url.url.clone(),
            title: new_url.title.clone(),
            description: new_url.description.clone(),
            position,
            updated_at: Utc::now(),
        };
        t.urls.push(entry.clone());
        Ok(entry)
    }

    async fn update_url(&self, url_id: i64, new_url: &str) -> Result<Option<UrlEntry>, AppError> {
        let mut t = self.tables.lock().await;
        Ok(t.urls.iter_mut().find(|u| u.id == url_id).map(|entry| {
            entry.url = new_url.to_string();
            entry.updated_at = Utc::now();
            entry.clone()
        }))
    }

    async fn delete_url(&self, url_id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        let before = t.urls.len();
        t.urls.retain(|u| u.id != url_id);
        Ok(t.urls.len() < before)
    }

    async fn delete_list(&self, custom_url: &str) -> Result<bool, AppError> {
        let mut t = self.tables.lock().await;
        let Some(list_id) = t
            .lists
            .iter()
            .find(|l| l.custom_url == custom_url)
            .map(|l| l.id)
        else {
            return Ok(false);
        };
        t.urls.retain(|u| u.list_id != list_id);
        t.lists.retain(|l| l.id != list_id);
        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn positions_continue_after_gaps() {
        let store = MemoryListStore::new();
        let list = store.create_list("gaps").await.unwrap();
        let a = store.add_url_to_list(&NewUrl::new(list.id, "https://a.com")).await.unwrap();
        let b = store.add_url_to_list(&NewUrl::new(list.id, "https://b.com")).await.unwrap();
        assert!(store.delete_url(b.id).await.unwrap());
        store.delete_url(a.id).await.unwrap();
        let c = store.add_url_to_list(&NewUrl::new(list.id, "https://c.com")).await.unwrap();
        // Every entry was removed, so the list restarts at position 0.
        assert_eq!(c.position, 0);

        let d = store.add_url_to_list(&NewUrl::new(list.id, "https://d.com")).await.unwrap();
        store.delete_url(c.id).await.unwrap();
        let e = store.add_url_to_list(&NewUrl::new(list.id, "https://e.com")).await.unwrap();
        assert_eq!((d.position, e.position), (1, 2));
    }

    #[tokio::test]
    async fn positions_are_per_list() {
        let store = MemoryListStore::new();
        let first = store.create_list("first").await.unwrap();
        let second = store.create_list("second").await.unwrap();
        store.add_url_to_list(&NewUrl::new(first.id, "https://a.com")).await.unwrap();
        let other = store
            .add_url_to_list(&NewUrl::new(second.id, "https://b.com"))
            .await
            .unwrap();
        assert_eq!(other.position, 0);
    }

    #[tokio::test]
    async fn duplicate_slug_is_conflict() {
        let store = MemoryListStore::new();
        store.create_list("demo").await.unwrap();
        assert!(matches!(
            store.create_list("demo").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn append_to_missing_list_is_invalid_reference() {
        let store = MemoryListStore::new();
        assert!(matches!(
            store.add_url_to_list(&NewUrl::new(42, "https://a.com")).await,
            Err(AppError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn delete_list_cascades_to_entries() {
        let store = MemoryListStore::new();
        let list = store.create_list("gone").await.unwrap();
        let entry = store.add_url_to_list(&NewUrl::new(list.id, "https://a.com")).await.unwrap();

        assert!(store.delete_list("gone").await.unwrap());
        assert!(store.get_list("gone").await.unwrap().is_none());
        assert!(!store.delete_url(entry.id).await.unwrap());
        assert!(!store.delete_list("gone").await.unwrap());
    }

    #[tokio::test]
    async fn update_of_missing_entry_is_none() {
        let store = MemoryListStore::new();
        assert!(store.update_url(7, "https://x.com").await.unwrap().is_none());
    }
}
