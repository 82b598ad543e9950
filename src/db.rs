use crate::{
    config::AppConfig,
    filter::{Filter, OrderBy},
    models::{NewShortcut, ShortcutPatch, StoredShortcut},
    store::{ShortcutStore, StoreError},
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    QueryBuilder, Sqlite, SqlitePool,
};
use uuid::Uuid;

const SELECT_SHORTCUTS: &str =
    "SELECT uuid, type, csid, shortcut, msg, created_at, updated_at FROM shortcuts";

// ── Pool ───────────────────────────────────────────────────────────────────

/// Open the SQLite pool described by `config`, creating the file if needed.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(
            config
                .database_url
                .parse::<SqliteConnectOptions>()?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
        )
        .await
}

/// Run embedded migrations (files in migrations/).
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

// ── Store ──────────────────────────────────────────────────────────────────

/// `ShortcutStore` backed by the `shortcuts` table.
#[derive(Clone, Debug)]
pub struct SqliteShortcutStore {
    pool: SqlitePool,
}

impl SqliteShortcutStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ShortcutStore for SqliteShortcutStore {
    async fn find_all(
        &self,
        filter: Option<&Filter>,
        order: &[OrderBy],
    ) -> Result<Vec<StoredShortcut>, StoreError> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_SHORTCUTS);

        if let Some(filter) = filter {
            query.push(" WHERE ");
            push_filter(&mut query, filter);
        }

        if !order.is_empty() {
            query.push(" ORDER BY ");
            let mut columns = query.separated(", ");
            for o in order {
                columns.push(format!("{} {}", o.key.column(), o.direction.keyword()));
            }
        }

        let rows = query
            .build_query_as::<StoredShortcut>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn find_by_id(&self, uuid: &str) -> Result<Option<StoredShortcut>, StoreError> {
        let row: Option<StoredShortcut> =
            sqlx::query_as(&format!("{SELECT_SHORTCUTS} WHERE uuid = ?1"))
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row)
    }

    async fn create(&self, shortcut: &NewShortcut) -> Result<StoredShortcut, StoreError> {
        let uuid = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            "INSERT INTO shortcuts (uuid, type, csid, shortcut, msg, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&uuid)
        .bind(&shortcut.kind)
        .bind(&shortcut.csid)
        .bind(&shortcut.shortcut)
        .bind(&shortcut.msg)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row: StoredShortcut = sqlx::query_as(&format!("{SELECT_SHORTCUTS} WHERE uuid = ?1"))
            .bind(&uuid)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(
        &self,
        uuid: &str,
        patch: &ShortcutPatch,
        updated_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE shortcuts
             SET shortcut = COALESCE(?1, shortcut),
                 msg = COALESCE(?2, msg),
                 updated_at = ?3
             WHERE uuid = ?4",
        )
        .bind(patch.shortcut.as_deref())
        .bind(patch.msg.as_deref())
        .bind(updated_at)
        .bind(uuid)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, uuid: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM shortcuts WHERE uuid = ?1")
            .bind(uuid)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Append `filter` as a parenthesised SQL predicate, binding every value.
fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    match filter {
        Filter::Eq(field, value) => {
            query
                .push(field.column())
                .push(" = ")
                .push_bind(value.clone());
        }
        Filter::And(clauses) if clauses.is_empty() => {
            query.push("1 = 1");
        }
        Filter::Or(alternatives) if alternatives.is_empty() => {
            query.push("1 = 0");
        }
        Filter::And(parts) | Filter::Or(parts) => {
            let joiner = if matches!(filter, Filter::And(_)) {
                " AND "
            } else {
                " OR "
            };
            query.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    query.push(joiner);
                }
                push_filter(query, part);
            }
            query.push(")");
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // One connection: every `sqlite::memory:` connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Field, SortKey};

    async fn store() -> SqliteShortcutStore {
        SqliteShortcutStore::new(test_pool().await)
    }

    #[tokio::test]
    async fn create_assigns_uuid_and_reads_back() {
        let store = store().await;

        let created = store
            .create(&NewShortcut::new("chat", "room1", "/hi", "hello"))
            .await
            .unwrap();

        assert_eq!(created.uuid.len(), 36);
        assert_eq!(created.kind, "chat");
        assert_eq!(created.created_at, created.updated_at);

        let found = store.find_by_id(&created.uuid).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn find_by_id_missing_is_none() {
        let store = store().await;
        assert_eq!(store.find_by_id("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unique_index_rejects_duplicate_triple() {
        let store = store().await;
        let shortcut = NewShortcut::new("chat", "room1", "/hi", "hello");

        store.create(&shortcut).await.unwrap();
        let err = store.create(&shortcut).await.unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    async fn find_all_filters_and_orders() {
        let store = store().await;
        for (csid, shortcut) in [("room1", "/c"), ("room1", "/a"), ("room2", "/b")] {
            store
                .create(&NewShortcut::new("chat", csid, shortcut, "m"))
                .await
                .unwrap();
        }

        let all = store
            .find_all(None, &[OrderBy::asc(SortKey::Shortcut)])
            .await
            .unwrap();
        let shortcuts: Vec<_> = all.iter().map(|r| r.shortcut.as_str()).collect();
        assert_eq!(shortcuts, vec!["/a", "/b", "/c"]);

        let room1 = Filter::eq(Field::Kind, "chat").and(Field::Csid, "room1");
        let rows = store
            .find_all(Some(&room1), &[OrderBy::desc(SortKey::Shortcut)])
            .await
            .unwrap();
        let shortcuts: Vec<_> = rows.iter().map(|r| r.shortcut.as_str()).collect();
        assert_eq!(shortcuts, vec!["/c", "/a"]);

        let either = Filter::any_of([
            Filter::eq(Field::Shortcut, "/a"),
            Filter::eq(Field::Csid, "room2"),
        ]);
        let rows = store.find_all(Some(&either), &[]).await.unwrap();
        assert_eq!(rows.len(), 2);

        let none = store.find_all(Some(&Filter::Or(Vec::new())), &[]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn find_all_matches_derived_id() {
        let store = store().await;
        let created = store
            .create(&NewShortcut::new("chat", "room1", "/hi", "hello"))
            .await
            .unwrap();

        let by_id = Filter::eq(Field::Id, crate::models::create_key(&created.uuid));
        let rows = store.find_all(Some(&by_id), &[]).await.unwrap();
        assert_eq!(rows, vec![created]);
    }

    #[tokio::test]
    async fn update_applies_patch_and_timestamp() {
        let store = store().await;
        let created = store
            .create(&NewShortcut::new("chat", "room1", "/hi", "hello"))
            .await
            .unwrap();

        let stamp = Utc::now().naive_utc();
        store
            .update(&created.uuid, &ShortcutPatch::new().msg("howdy"), stamp)
            .await
            .unwrap();

        let row = store.find_by_id(&created.uuid).await.unwrap().unwrap();
        assert_eq!(row.shortcut, "/hi");
        assert_eq!(row.msg, "howdy");
        assert_eq!(row.updated_at, stamp);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = store().await;
        let created = store
            .create(&NewShortcut::new("chat", "room1", "/hi", "hello"))
            .await
            .unwrap();

        store.delete(&created.uuid).await.unwrap();
        assert_eq!(store.find_by_id(&created.uuid).await.unwrap(), None);
    }
}
