use crate::models::ShortcutRecord;
use std::cmp::Ordering;

/// Text fields a filter can compare for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Uuid,
    /// The derived display key.
    Id,
    Kind,
    Csid,
    Shortcut,
    Msg,
}

impl Field {
    pub fn value(self, record: &ShortcutRecord) -> &str {
        match self {
            Field::Uuid => &record.uuid,
            Field::Id => &record.id,
            Field::Kind => &record.kind,
            Field::Csid => &record.csid,
            Field::Shortcut => &record.shortcut,
            Field::Msg => &record.msg,
        }
    }

    /// SQL expression for this field in the `shortcuts` table.
    pub fn column(self) -> &'static str {
        match self {
            Field::Uuid => "uuid",
            Field::Id => "substr(uuid, 1, 8)",
            Field::Kind => "type",
            Field::Csid => "csid",
            Field::Shortcut => "shortcut",
            Field::Msg => "msg",
        }
    }
}

/// A query predicate over shortcut records.
///
/// Equality clauses combine through conjunction and disjunction. An empty
/// `And` matches every record; an empty `Or` matches none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(Field, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    /// Matches every record.
    pub fn all() -> Self {
        Filter::And(Vec::new())
    }

    pub fn eq(field: Field, value: impl Into<String>) -> Self {
        Filter::Eq(field, value.into())
    }

    pub fn uuid(uuid: impl Into<String>) -> Self {
        Self::eq(Field::Uuid, uuid)
    }

    /// Alternatives whose matches are unioned.
    pub fn any_of(alternatives: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(alternatives.into_iter().collect())
    }

    /// Add an equality clause to this filter as a conjunction.
    pub fn and(self, field: Field, value: impl Into<String>) -> Self {
        let clause = Self::eq(field, value);
        match self {
            Filter::And(mut clauses) => {
                clauses.push(clause);
                Filter::And(clauses)
            }
            other => Filter::And(vec![other, clause]),
        }
    }

    pub fn matches(&self, record: &ShortcutRecord) -> bool {
        match self {
            Filter::Eq(field, value) => field.value(record) == value.as_str(),
            Filter::And(clauses) => clauses.iter().all(|c| c.matches(record)),
            Filter::Or(alternatives) => alternatives.iter().any(|a| a.matches(record)),
        }
    }

    /// Select matching records in collection order.
    ///
    /// A top-level `Or` yields each alternative's matches one after another,
    /// so a record matching two alternatives is returned twice.
    pub fn select<'r>(&self, records: &'r [ShortcutRecord]) -> Vec<&'r ShortcutRecord> {
        match self {
            Filter::Or(alternatives) => alternatives
                .iter()
                .flat_map(move |alt| records.iter().filter(move |r| alt.matches(r)))
                .collect(),
            _ => records.iter().filter(|r| self.matches(r)).collect(),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

// ── Ordering ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Uuid,
    Kind,
    Csid,
    Shortcut,
    Msg,
    CreatedAt,
    UpdatedAt,
}

impl SortKey {
    fn compare(self, a: &ShortcutRecord, b: &ShortcutRecord) -> Ordering {
        match self {
            SortKey::Uuid => a.uuid.cmp(&b.uuid),
            SortKey::Kind => a.kind.cmp(&b.kind),
            SortKey::Csid => a.csid.cmp(&b.csid),
            SortKey::Shortcut => a.shortcut.cmp(&b.shortcut),
            SortKey::Msg => a.msg.cmp(&b.msg),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            SortKey::Uuid => "uuid",
            SortKey::Kind => "type",
            SortKey::Csid => "csid",
            SortKey::Shortcut => "shortcut",
            SortKey::Msg => "msg",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub key: SortKey,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(key: SortKey) -> Self {
        Self {
            key,
            direction: Direction::Asc,
        }
    }

    pub fn desc(key: SortKey) -> Self {
        Self {
            key,
            direction: Direction::Desc,
        }
    }
}

/// Compare two records by each ordering in turn; the first non-equal one wins.
pub fn compare(order: &[OrderBy], a: &ShortcutRecord, b: &ShortcutRecord) -> Ordering {
    order
        .iter()
        .map(|o| match o.direction {
            Direction::Asc => o.key.compare(a, b),
            Direction::Desc => o.key.compare(b, a),
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShortcutRecord, StoredShortcut};

    fn record(uuid: &str, kind: &str, csid: &str, shortcut: &str) -> ShortcutRecord {
        let now = chrono::Utc::now().naive_utc();
        ShortcutRecord::from_stored(StoredShortcut {
            uuid: uuid.into(),
            kind: kind.into(),
            csid: csid.into(),
            shortcut: shortcut.into(),
            msg: format!("msg for {shortcut}"),
            created_at: now,
            updated_at: now,
        })
    }

    fn sample() -> Vec<ShortcutRecord> {
        vec![
            record("00000001-aaaa", "chat", "room1", "/a"),
            record("00000002-bbbb", "chat", "room2", "/b"),
            record("00000003-cccc", "mail", "room1", "/c"),
        ]
    }

    #[test]
    fn empty_conjunction_matches_everything() {
        let records = sample();
        assert_eq!(Filter::all().select(&records).len(), 3);
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        let records = sample();
        assert!(Filter::Or(Vec::new()).select(&records).is_empty());
    }

    #[test]
    fn conjunction_requires_every_clause() {
        let records = sample();
        let filter = Filter::eq(Field::Kind, "chat").and(Field::Csid, "room1");
        let hits = filter.select(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].shortcut, "/a");
    }

    #[test]
    fn top_level_disjunction_keeps_duplicates() {
        let records = sample();
        let filter = Filter::any_of([
            Filter::eq(Field::Kind, "chat"),
            Filter::eq(Field::Csid, "room1"),
        ]);
        let hits: Vec<_> = filter.select(&records).iter().map(|r| r.shortcut.as_str()).collect();
        assert_eq!(hits, vec!["/a", "/b", "/a", "/c"]);
    }

    #[test]
    fn nested_disjunction_is_boolean() {
        let records = sample();
        let filter = Filter::And(vec![
            Filter::eq(Field::Csid, "room1"),
            Filter::any_of([Filter::eq(Field::Kind, "chat"), Filter::eq(Field::Kind, "mail")]),
        ]);
        assert_eq!(filter.select(&records).len(), 2);
    }

    #[test]
    fn id_field_matches_derived_key() {
        let records = sample();
        let hits = Filter::eq(Field::Id, "00000002").select(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uuid, "00000002-bbbb");
    }

    #[test]
    fn compare_applies_keys_in_order() {
        let mut records = sample();
        let order = [OrderBy::asc(SortKey::Csid), OrderBy::desc(SortKey::Shortcut)];
        records.sort_by(|a, b| compare(&order, a, b));
        let shortcuts: Vec<_> = records.iter().map(|r| r.shortcut.as_str()).collect();
        assert_eq!(shortcuts, vec!["/c", "/a", "/b"]);
    }

    #[test]
    fn empty_order_keeps_input_order() {
        let mut records = sample();
        records.reverse();
        records.sort_by(|a, b| compare(&[], a, b));
        assert_eq!(records[0].shortcut, "/c");
    }
}
