//! Write-through, full-table in-memory cache of shortcut records in front of
//! a persistent store.

pub mod cache;
pub mod config;
pub mod db;
pub mod filter;
pub mod models;
pub mod store;

pub use cache::{CacheError, Listing, ShortcutCache};
pub use filter::{Direction, Field, Filter, OrderBy, SortKey};
pub use models::{
    create_key, NewShortcut, Projection, ShortcutKey, ShortcutPatch, ShortcutRecord,
    ShortcutSummary, StoredShortcut,
};
pub use store::{ShortcutStore, StoreError};
