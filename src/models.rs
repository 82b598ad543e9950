use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of leading `uuid` characters that make up a record's display key.
pub const KEY_LEN: usize = 8;

/// Derive the short display key for a record: the first 8 characters of its uuid.
pub fn create_key(uuid: &str) -> String {
    uuid.chars().take(KEY_LEN).collect()
}

/// A shortcut row as the backing store returns it from the `shortcuts` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredShortcut {
    pub uuid: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub csid: String,
    pub shortcut: String,
    pub msg: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A cached shortcut record: the stored row plus its derived display key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutRecord {
    pub uuid: String,
    /// Derived once from `uuid`, never recomputed.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub csid: String,
    pub shortcut: String,
    pub msg: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ShortcutRecord {
    pub fn from_stored(stored: StoredShortcut) -> Self {
        Self {
            id: create_key(&stored.uuid),
            uuid: stored.uuid,
            kind: stored.kind,
            csid: stored.csid,
            shortcut: stored.shortcut,
            msg: stored.msg,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    /// The `(type, csid, shortcut)` group this record occupies.
    pub fn key(&self) -> ShortcutKey {
        ShortcutKey {
            kind: self.kind.clone(),
            csid: self.csid.clone(),
            shortcut: self.shortcut.clone(),
        }
    }

    pub(crate) fn has_key(&self, key: &ShortcutKey) -> bool {
        self.kind == key.kind && self.csid == key.csid && self.shortcut == key.shortcut
    }
}

/// Input for creating a shortcut. The store assigns `uuid` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShortcut {
    #[serde(rename = "type")]
    pub kind: String,
    pub csid: String,
    pub shortcut: String,
    pub msg: String,
}

impl NewShortcut {
    pub fn new(
        kind: impl Into<String>,
        csid: impl Into<String>,
        shortcut: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            csid: csid.into(),
            shortcut: shortcut.into(),
            msg: msg.into(),
        }
    }

    pub fn key(&self) -> ShortcutKey {
        ShortcutKey {
            kind: self.kind.clone(),
            csid: self.csid.clone(),
            shortcut: self.shortcut.clone(),
        }
    }
}

/// Partial update of a shortcut. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutPatch {
    pub shortcut: Option<String>,
    pub msg: Option<String>,
}

impl ShortcutPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = Some(msg.into());
        self
    }

    /// The new shortcut value, if it differs from `record`'s.
    pub(crate) fn shortcut_change<'a>(&'a self, record: &ShortcutRecord) -> Option<&'a str> {
        self.shortcut
            .as_deref()
            .filter(|shortcut| *shortcut != record.shortcut)
    }

    pub(crate) fn changes_msg(&self, record: &ShortcutRecord) -> bool {
        self.msg.as_deref().is_some_and(|msg| msg != record.msg)
    }

    /// Merge the patch into `record` in place.
    pub(crate) fn apply_to(&self, record: &mut ShortcutRecord) {
        if let Some(shortcut) = &self.shortcut {
            record.shortcut.clone_from(shortcut);
        }
        if let Some(msg) = &self.msg {
            record.msg.clone_from(msg);
        }
    }
}

// ── Projections ────────────────────────────────────────────────────────────

/// A typed view of a cached record, selected by `ShortcutCache::list_all`.
pub trait Projection {
    fn project(record: &ShortcutRecord) -> Self;
}

impl Projection for ShortcutRecord {
    fn project(record: &ShortcutRecord) -> Self {
        record.clone()
    }
}

/// The composite uniqueness group of a shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShortcutKey {
    #[serde(rename = "type")]
    pub kind: String,
    pub csid: String,
    pub shortcut: String,
}

impl fmt::Display for ShortcutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} csid={} shortcut={}",
            self.kind, self.csid, self.shortcut
        )
    }
}

impl Projection for ShortcutKey {
    fn project(record: &ShortcutRecord) -> Self {
        record.key()
    }
}

/// What a shortcut picker needs: the display key, the trigger and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutSummary {
    pub id: String,
    pub shortcut: String,
    pub msg: String,
}

impl Projection for ShortcutSummary {
    fn project(record: &ShortcutRecord) -> Self {
        Self {
            id: record.id.clone(),
            shortcut: record.shortcut.clone(),
            msg: record.msg.clone(),
        }
    }
}
