use crate::{
    filter::{compare, Filter, OrderBy, SortKey},
    models::{NewShortcut, Projection, ShortcutKey, ShortcutPatch, ShortcutRecord},
    store::{ShortcutStore, StoreError},
};
use chrono::Utc;
use tokio::sync::RwLock;

pub use crate::models::create_key;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Another record already holds this `(type, csid, shortcut)` group.
    /// Raised before the store is contacted.
    #[error("unique constraint violated: {0}")]
    UniqueConstraint(ShortcutKey),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Matching rows and their count, as returned by `list_and_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub count: usize,
    pub rows: Vec<ShortcutRecord>,
}

/// Write-through, full-table cache of shortcut records.
///
/// The whole table is loaded once by `init`; after that every read is served
/// from memory. Mutations are applied to the store first and mirrored into
/// memory only when the store succeeds. Each mutation holds the write lock
/// from its uniqueness check until the in-memory update, so two callers can
/// never both pass the check for the same group.
pub struct ShortcutCache<S> {
    store: S,
    records: RwLock<Vec<ShortcutRecord>>,
}

impl<S: ShortcutStore> ShortcutCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the cached collection with every stored record, ordered by
    /// shortcut. Returns the number of records loaded.
    pub async fn init(&self) -> Result<usize, CacheError> {
        let mut records = self.records.write().await;

        let loaded: Vec<ShortcutRecord> = self
            .store
            .find_all(None, &[OrderBy::asc(SortKey::Shortcut)])
            .await?
            .into_iter()
            .map(ShortcutRecord::from_stored)
            .collect();

        *records = loaded;

        tracing::info!("Shortcut cache loaded with {} record(s)", records.len());
        Ok(records.len())
    }

    /// Look up a record by uuid, falling back to the store on a cache miss.
    /// A record found only in the store is returned but not cached.
    pub async fn find_by_id(&self, uuid: &str) -> Result<Option<ShortcutRecord>, CacheError> {
        {
            let records = self.records.read().await;
            if let Some(hit) = records.iter().find(|r| r.uuid == uuid) {
                return Ok(Some(hit.clone()));
            }
        }

        tracing::debug!("Shortcut {} not cached, querying store", uuid);
        let stored = self.store.find_by_id(uuid).await?;
        Ok(stored.map(ShortcutRecord::from_stored))
    }

    pub async fn create(&self, shortcut: &NewShortcut) -> Result<ShortcutRecord, CacheError> {
        let mut records = self.records.write().await;

        let key = shortcut.key();
        if records.iter().any(|r| r.has_key(&key)) {
            tracing::warn!("Rejected duplicate shortcut ({})", key);
            return Err(CacheError::UniqueConstraint(key));
        }

        let created = ShortcutRecord::from_stored(self.store.create(shortcut).await?);
        records.push(created.clone());

        Ok(created)
    }

    /// Apply `patch` to the first cached record matching `condition`.
    ///
    /// Returns `Ok(None)` without touching the store when nothing matches or
    /// when the patch would leave both shortcut and message unchanged.
    pub async fn update(
        &self,
        patch: &ShortcutPatch,
        condition: &Filter,
    ) -> Result<Option<ShortcutRecord>, CacheError> {
        let mut records = self.records.write().await;

        let Some(index) = records.iter().position(|r| condition.matches(r)) else {
            tracing::debug!("Update skipped, no cached shortcut matches {:?}", condition);
            return Ok(None);
        };

        let current = &records[index];
        match patch.shortcut_change(current) {
            None if !patch.changes_msg(current) => {
                tracing::debug!("Update skipped, shortcut {} unchanged", current.uuid);
                return Ok(None);
            }
            None => {}
            Some(shortcut) => {
                let key = ShortcutKey {
                    shortcut: shortcut.to_owned(),
                    ..current.key()
                };
                if records.iter().any(|r| r.has_key(&key)) {
                    tracing::warn!("Rejected shortcut rename to ({})", key);
                    return Err(CacheError::UniqueConstraint(key));
                }
            }
        }

        let uuid = current.uuid.clone();
        let now = Utc::now().naive_utc();
        self.store.update(&uuid, patch, now).await?;

        let record = &mut records[index];
        patch.apply_to(record);
        record.updated_at = now;

        Ok(Some(record.clone()))
    }

    /// Remove the first cached record matching `condition` from the store and
    /// the cache. Returns `Ok(None)` when nothing matches.
    pub async fn delete(&self, condition: &Filter) -> Result<Option<ShortcutRecord>, CacheError> {
        let mut records = self.records.write().await;

        let Some(index) = records.iter().position(|r| condition.matches(r)) else {
            tracing::debug!("Delete skipped, no cached shortcut matches {:?}", condition);
            return Ok(None);
        };

        let uuid = records[index].uuid.clone();
        self.store.delete(&uuid).await?;

        Ok(Some(records.remove(index)))
    }

    pub async fn list_and_count(&self, filter: &Filter, order: &[OrderBy]) -> Listing {
        let records = self.records.read().await;

        let mut rows: Vec<ShortcutRecord> = filter.select(&records).into_iter().cloned().collect();
        rows.sort_by(|a, b| compare(order, a, b));

        Listing {
            count: rows.len(),
            rows,
        }
    }

    /// Matching records projected into the view `P`.
    pub async fn list_all<P: Projection>(&self, filter: &Filter) -> Vec<P> {
        let records = self.records.read().await;
        filter.select(&records).into_iter().map(P::project).collect()
    }

    pub async fn count(&self, filter: &Filter) -> usize {
        let records = self.records.read().await;
        filter.select(&records).len()
    }

    /// Number of records currently cached.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
