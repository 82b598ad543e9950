use crate::{
    filter::{Filter, OrderBy},
    models::{NewShortcut, ShortcutPatch, StoredShortcut},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Failure reported by a backing store. Passed through the cache unchanged.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// Durable persistence for shortcut records, fronted by `ShortcutCache`.
#[async_trait]
pub trait ShortcutStore: Send + Sync {
    /// All records matching `filter` (every record for `None`), sorted by `order`.
    async fn find_all(
        &self,
        filter: Option<&Filter>,
        order: &[OrderBy],
    ) -> Result<Vec<StoredShortcut>, StoreError>;

    async fn find_by_id(&self, uuid: &str) -> Result<Option<StoredShortcut>, StoreError>;

    /// Persist a new record and return it with its assigned `uuid`.
    async fn create(&self, shortcut: &NewShortcut) -> Result<StoredShortcut, StoreError>;

    /// Apply `patch` to the record with `uuid`, stamping it with `updated_at`.
    async fn update(
        &self,
        uuid: &str,
        patch: &ShortcutPatch,
        updated_at: NaiveDateTime,
    ) -> Result<(), StoreError>;

    async fn delete(&self, uuid: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ShortcutStore + ?Sized> ShortcutStore for Arc<S> {
    async fn find_all(
        &self,
        filter: Option<&Filter>,
        order: &[OrderBy],
    ) -> Result<Vec<StoredShortcut>, StoreError> {
        (**self).find_all(filter, order).await
    }

    async fn find_by_id(&self, uuid: &str) -> Result<Option<StoredShortcut>, StoreError> {
        (**self).find_by_id(uuid).await
    }

    async fn create(&self, shortcut: &NewShortcut) -> Result<StoredShortcut, StoreError> {
        (**self).create(shortcut).await
    }

    async fn update(
        &self,
        uuid: &str,
        patch: &ShortcutPatch,
        updated_at: NaiveDateTime,
    ) -> Result<(), StoreError> {
        (**self).update(uuid, patch, updated_at).await
    }

    async fn delete(&self, uuid: &str) -> Result<(), StoreError> {
        (**self).delete(uuid).await
    }
}
