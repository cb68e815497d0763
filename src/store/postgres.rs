//! `ListStore` over PostgreSQL. Every value is a bound parameter.

use super::ListStore;
use crate::error::AppError;
use crate::model::{NewUrl, UrlEntry, UrlList};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

const ENTRY_COLUMNS: &str = "id, list_id, url, title, description, position, updated_at";

const JOINED_SELECT: &str = r#"
    SELECT l.id, l.custom_url, l.created_at,
           u.id AS url_id, u.url, u.title, u.description, u.position, u.updated_at
    FROM url_lists l
    LEFT JOIN urls u ON u.list_id = l.id
"#;

#[derive(Clone, Debug)]
pub struct PgListStore {
    pool: PgPool,
}

impl PgListStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// One row of the list/entry outer join. Entry columns are NULL for empty lists.
#[derive(Debug, Clone, FromRow)]
struct JoinedRow {
    id: i64,
    custom_url: String,
    created_at: DateTime<Utc>,
    url_id: Option<i64>,
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    position: Option<i32>,
    updated_at: Option<DateTime<Utc>>,
}

/// A duplicate `(list_id, position)` means a concurrent append won the slot;
/// a foreign key failure means the list is gone.
fn append_error(err: sqlx::Error, list_id: i64) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!(
                "position conflict on list {}, retry",
                list_id
            ));
        }
    }
    AppError::from_write(err, format!("list {} does not exist", list_id))
}

/// Fold joined rows into lists, keeping the order in which lists first appear
/// and the order of entries within each list.
fn group_joined_rows(rows: Vec<JoinedRow>) -> Vec<UrlList> {
    let mut lists: Vec<UrlList> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for row in rows {
        let slot = *index.entry(row.id).or_insert_with(|| {
            lists.push(UrlList {
                id: row.id,
                custom_url: row.custom_url.clone(),
                created_at: row.created_at,
                urls: Vec::new(),
            });
            lists.len() - 1
        });
        if let (Some(id), Some(url), Some(position), Some(updated_at)) =
            (row.url_id, row.url, row.position, row.updated_at)
        {
            lists[slot].urls.push(UrlEntry {
                id,
                list_id: row.id,
                url,
                title: row.title,
                description: row.description,
                position,
                updated_at,
            });
        }
    }
    lists
}

#[async_trait]
impl ListStore for PgListStore {
    async fn create_list(&self, custom_url: &str) -> Result<UrlList, AppError> {
        let row: (i64, String, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO url_lists (custom_url) VALUES ($1) RETURNING id, custom_url, created_at",
        )
        .bind(custom_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_write(e, format!("list '{}' already exists", custom_url)))?;
        Ok(UrlList {
            id: row.0,
            custom_url: row.1,
            created_at: row.2,
            urls: Vec::new(),
        })
    }

    async fn get_list(&self, custom_url: &str) -> Result<Option<UrlList>, AppError> {
        let sql = format!("{} WHERE l.custom_url = $1 ORDER BY u.position", JOINED_SELECT);
        tracing::debug!(sql = %sql, custom_url, "query");
        let rows: Vec<JoinedRow> = sqlx::query_as(&sql)
            .bind(custom_url)
            .fetch_all(&self.pool)
            .await?;
        Ok(group_joined_rows(rows).into_iter().next())
    }

    async fn get_all_lists(&self) -> Result<Vec<UrlList>, AppError> {
        let sql = format!(
            "{} ORDER BY l.created_at DESC, l.id DESC, u.position",
            JOINED_SELECT
        );
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<JoinedRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(group_joined_rows(rows))
    }

    async fn add_url_to_list(&self, new_url: &NewUrl) -> Result<UrlEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        // The parent row lock serializes appends to one list for the MAX(position) read.
        let parent: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM url_lists WHERE id = $1 FOR UPDATE")
                .bind(new_url.list_id)
                .fetch_optional(&mut *tx)
                .await?;
        if parent.is_none() {
            return Err(AppError::InvalidReference(format!(
                "list {} does not exist",
                new_url.list_id
            )));
        }

        let sql = format!(
            r#"
            INSERT INTO urls (list_id, url, title, description, position)
            SELECT $1, $2, $3, $4, COALESCE(MAX(position), -1) + 1
            FROM urls WHERE list_id = $1
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        );
        tracing::debug!(sql = %sql, list_id = new_url.list_id, "query (tx)");
        let entry: UrlEntry = sqlx::query_as(&sql)
            .bind(new_url.list_id)
            .bind(&new_url.url)
            .bind(&new_url.title)
            .bind(&new_url.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| append_error(e, new_url.list_id))?;

        tx.commit().await?;
        Ok(entry)
    }

    async fn update_url(&self, url_id: i64, new_url: &str) -> Result<Option<UrlEntry>, AppError> {
        let sql = format!(
            "UPDATE urls SET url = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            ENTRY_COLUMNS
        );
        let entry: Option<UrlEntry> = sqlx::query_as(&sql)
            .bind(new_url)
            .bind(url_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn delete_url(&self, url_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM urls WHERE id = $1")
            .bind(url_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_list(&self, custom_url: &str) -> Result<bool, AppError> {
        // Entries go first; ON DELETE CASCADE on urls.list_id is not assumed.
        let mut tx = self.pool.begin().await?;
        let entries = sqlx::query(
            "DELETE FROM urls WHERE list_id IN (SELECT id FROM url_lists WHERE custom_url = $1)",
        )
        .bind(custom_url)
        .execute(&mut *tx)
        .await?;
        let lists = sqlx::query("DELETE FROM url_lists WHERE custom_url = $1")
            .bind(custom_url)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(
            custom_url,
            entries = entries.rows_affected(),
            "list rows deleted"
        );
        Ok(lists.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("constraint violated")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::ForeignKeyViolation
            }
        }
    }

    fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError { unique }))
    }

    #[test]
    fn append_position_clash_is_a_retryable_conflict() {
        match append_error(db_error(true), 7) {
            AppError::Conflict(msg) => assert_eq!(msg, "position conflict on list 7, retry"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn append_foreign_key_failure_names_the_list() {
        match append_error(db_error(false), 7) {
            AppError::InvalidReference(msg) => assert_eq!(msg, "list 7 does not exist"),
            other => panic!("expected invalid reference, got {other:?}"),
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn list_row(id: i64, slug: &str) -> JoinedRow {
        JoinedRow {
            id,
            custom_url: slug.into(),
            created_at: ts(id),
            url_id: None,
            url: None,
            title: None,
            description: None,
            position: None,
            updated_at: None,
        }
    }

    fn entry_row(id: i64, slug: &str, url_id: i64, position: i32) -> JoinedRow {
        JoinedRow {
            url_id: Some(url_id),
            url: Some(format!("https://{}.example", url_id)),
            position: Some(position),
            updated_at: Some(ts(100)),
            ..list_row(id, slug)
        }
    }

    #[test]
    fn empty_list_row_yields_list_without_entries() {
        let lists = group_joined_rows(vec![list_row(1, "solo")]);
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].custom_url, "solo");
        assert!(lists[0].urls.is_empty());
    }

    #[test]
    fn groups_entries_under_their_list_in_row_order() {
        let lists = group_joined_rows(vec![
            entry_row(2, "newer", 10, 0),
            entry_row(2, "newer", 11, 3),
            list_row(1, "older"),
        ]);
        assert_eq!(lists.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(
            lists[0].urls.iter().map(|u| u.position).collect::<Vec<_>>(),
            vec![0, 3]
        );
        assert!(lists[0].urls.iter().all(|u| u.list_id == 2));
        assert!(lists[1].urls.is_empty());
    }

    #[test]
    fn no_rows_means_no_lists() {
        assert!(group_joined_rows(Vec::new()).is_empty());
    }

    async fn store() -> PgListStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(8)
            .connect(&url)
            .await
            .expect("pool creation failed");
        crate::store::ensure_schema(&pool).await.expect("schema");
        PgListStore::new(pool)
    }

    fn unique_slug(prefix: &str) -> String {
        format!("{}-{}", prefix, crate::slug::generate_slug())
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn duplicate_slug_is_conflict() {
        let store = store().await;
        let slug = unique_slug("dup");
        store.create_list(&slug).await.unwrap();
        let err = store.create_list(&slug).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
        store.delete_list(&slug).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn append_to_missing_list_is_invalid_reference() {
        let store = store().await;
        let err = store
            .add_url_to_list(&NewUrl::new(i64::MAX, "https://a.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)), "{err:?}");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_appends_get_distinct_positions() {
        let store = store().await;
        let slug = unique_slug("race");
        let list = store.create_list(&slug).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add_url_to_list(&NewUrl::new(list.id, format!("https://{}.com", i)))
                        .await
                        .expect("append failed")
                        .position
                })
            })
            .collect();
        let mut positions = Vec::new();
        for handle in handles {
            positions.push(handle.await.expect("task panicked"));
        }
        positions.sort_unstable();
        assert_eq!(positions, (0..10).collect::<Vec<_>>());
        store.delete_list(&slug).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deleting_list_removes_its_entries() {
        let store = store().await;
        let slug = unique_slug("cascade");
        let list = store.create_list(&slug).await.unwrap();
        let entry = store
            .add_url_to_list(&NewUrl::new(list.id, "https://a.com"))
            .await
            .unwrap();

        assert!(store.delete_list(&slug).await.unwrap());
        let (left,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM urls WHERE id = $1")
            .bind(entry.id)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(left, 0);
        assert!(!store.delete_list(&slug).await.unwrap());
    }
}
