//! Adaptive row construction and insertion.
//!
//! The board schema evolves across versions, so seed rows are adapted to
//! whatever columns the live table actually has instead of hard-coding a
//! column list per version.

use crate::db::{Database, TableDescriptor};
use crate::error::{FixtureError, Result};
use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use std::collections::BTreeMap;

/// Scalar value accepted by the adaptive row builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedValue {
    Int(i64),
    Text(String),
    Null,
}

impl SeedValue {
    pub fn text<S: Into<String>>(s: S) -> Self {
        SeedValue::Text(s.into())
    }
}

impl ToSql for SeedValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SeedValue::Int(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            SeedValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SeedValue::Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}

/// A requested row: column name to scalar value.
///
/// Ordered map, so the final payload and the generated SQL are
/// deterministic for a given requested row and table shape.
pub type SeedRow = BTreeMap<String, SeedValue>;

/// Build a SeedRow from (column, value) pairs
pub fn seed_row(pairs: &[(&str, SeedValue)]) -> SeedRow {
    pairs
        .iter()
        .map(|(column, value)| (column.to_string(), value.clone()))
        .collect()
}

/// Fallback for a NOT NULL column with no database default: zero for
/// numeric-looking declared types, empty string otherwise.
fn default_for_type(decl_type: Option<&str>) -> SeedValue {
    let Some(decl) = decl_type else {
        return SeedValue::text("");
    };
    let decl = decl.to_ascii_lowercase();
    if ["int", "numeric", "real", "float"]
        .iter()
        .any(|t| decl.contains(t))
    {
        SeedValue::Int(0)
    } else {
        SeedValue::text("")
    }
}

/// Adapt a requested row to the live table shape.
///
/// Requested columns the table does not have are dropped. The auto-assigned
/// primary key is excluded even when the requested row names it. Every
/// remaining NOT NULL column without a database default receives a
/// type-appropriate fallback; columns with a default are left to the
/// database.
pub fn normalize_row(info: &TableDescriptor, requested: &SeedRow) -> SeedRow {
    let auto_pk = info.auto_pk();
    let mut row = SeedRow::new();

    for (column, value) in requested {
        if auto_pk == Some(column.as_str()) {
            continue;
        }
        if info.contains(column) {
            row.insert(column.clone(), value.clone());
        }
    }

    for (column, meta) in info.iter() {
        if meta.primary_key || meta.has_default || !meta.notnull {
            continue;
        }
        if !row.contains_key(column) {
            row.insert(column.clone(), default_for_type(meta.decl_type.as_deref()));
        }
    }

    row
}

/// Normalize `requested` against the live schema and insert it.
/// Returns the auto-assigned row id.
///
/// Insert failures are fatal; fixture generation is a one-shot operation
/// and is never retried.
pub fn insert_row(db: &Database, table: &str, requested: &SeedRow) -> Result<i64> {
    let info = db.table_info(table)?;
    let row = normalize_row(&info, requested);

    let sql = if row.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    let params: Vec<&dyn ToSql> = row.values().map(|v| v as &dyn ToSql).collect();
    db.conn()
        .execute(&sql, params.as_slice())
        .map_err(|source| FixtureError::InsertFailed {
            table: table.to_string(),
            source,
        })?;

    Ok(db.conn().last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "CREATE TABLE items (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    amount INTEGER NOT NULL,
                    score NUMERIC NOT NULL,
                    label TEXT NOT NULL,
                    flagged INTEGER NOT NULL DEFAULT 0,
                    note TEXT
                )",
                [],
            )
            .unwrap();
        db
    }

    #[test]
    fn test_unknown_columns_dropped() {
        let db = setup();
        let info = db.table_info("items").unwrap();
        let requested = seed_row(&[
            ("title", SeedValue::text("a")),
            ("ghost", SeedValue::Int(7)),
        ]);
        let row = normalize_row(&info, &requested);
        assert!(!row.contains_key("ghost"));
        assert_eq!(row.get("title"), Some(&SeedValue::text("a")));
    }

    #[test]
    fn test_not_null_defaults_filled_by_type() {
        let db = setup();
        let info = db.table_info("items").unwrap();
        let requested = seed_row(&[("title", SeedValue::text("a"))]);
        let row = normalize_row(&info, &requested);

        // Numeric-looking declared types get zero
        assert_eq!(row.get("amount"), Some(&SeedValue::Int(0)));
        assert_eq!(row.get("score"), Some(&SeedValue::Int(0)));
        // Everything else gets an empty string
        assert_eq!(row.get("label"), Some(&SeedValue::text("")));
        // Database default wins over injection
        assert!(!row.contains_key("flagged"));
        // Nullable columns are left out entirely
        assert!(!row.contains_key("note"));
    }

    #[test]
    fn test_primary_key_never_in_payload() {
        let db = setup();
        let info = db.table_info("items").unwrap();
        let requested = seed_row(&[("id", SeedValue::Int(99)), ("title", SeedValue::text("a"))]);
        let row = normalize_row(&info, &requested);
        assert!(!row.contains_key("id"));
    }

    #[test]
    fn test_composite_key_columns_are_payload() {
        let db = setup();
        db.conn()
            .execute(
                "CREATE TABLE pairs (
                    left_id INTEGER NOT NULL,
                    right_id INTEGER NOT NULL,
                    PRIMARY KEY (left_id, right_id)
                )",
                [],
            )
            .unwrap();
        let info = db.table_info("pairs").unwrap();
        let requested = seed_row(&[
            ("left_id", SeedValue::Int(1)),
            ("right_id", SeedValue::Int(2)),
        ]);
        let row = normalize_row(&info, &requested);
        assert_eq!(row.get("left_id"), Some(&SeedValue::Int(1)));
        assert_eq!(row.get("right_id"), Some(&SeedValue::Int(2)));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let db = setup();
        let info = db.table_info("items").unwrap();
        let requested = seed_row(&[
            ("title", SeedValue::text("a")),
            ("note", SeedValue::Null),
            ("ghost", SeedValue::Int(1)),
        ]);
        let first = normalize_row(&info, &requested);
        let second = normalize_row(&info, &requested);
        assert_eq!(first, second);
    }

    #[test]
    fn test_insert_returns_rowid() {
        let db = setup();
        let requested = seed_row(&[("title", SeedValue::text("first"))]);
        let id = insert_row(&db, "items", &requested).unwrap();
        assert_eq!(id, 1);

        let title: String = db
            .conn()
            .query_row("SELECT title FROM items WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(title, "first");
    }

    #[test]
    fn test_insert_into_missing_table_fails() {
        let db = setup();
        let requested = seed_row(&[("title", SeedValue::text("a"))]);
        let result = insert_row(&db, "no_such_table", &requested);
        assert!(matches!(
            result,
            Err(FixtureError::InsertFailed { .. })
        ));
    }

    #[test]
    fn test_null_passes_through_for_nullable_column() {
        let db = setup();
        let requested = seed_row(&[
            ("title", SeedValue::text("a")),
            ("note", SeedValue::Null),
        ]);
        let id = insert_row(&db, "items", &requested).unwrap();
        let note: Option<String> = db
            .conn()
            .query_row("SELECT note FROM items WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(note, None);
    }
}
