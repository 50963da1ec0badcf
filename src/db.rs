//! Database connection and schema introspection.

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

/// Database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a connection to the database at the given path.
    ///
    /// The fixture must stay a single file, so WAL mode is never enabled.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Database { conn })
    }

    /// Open an in-memory database for testing
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Database { conn })
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Read the schema version marker, if the database carries one
    pub fn schema_version(&self) -> Result<Option<i64>> {
        if !self.table_exists("schema_version")? {
            return Ok(None);
        }
        self.conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    /// Describe a table's columns via `PRAGMA table_info`.
    ///
    /// A table that does not exist yields an empty descriptor, never an
    /// error. Callers use this to detect version-dependent schema features.
    /// The descriptor is recomputed on every call.
    pub fn table_info(&self, table: &str) -> Result<TableDescriptor> {
        let sql = format!("PRAGMA table_info('{table}')");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            let default: rusqlite::types::Value = row.get("dflt_value")?;
            Ok(ColumnInfo {
                name: row.get("name")?,
                decl_type: row.get("type")?,
                notnull: row.get::<_, i64>("notnull")? != 0,
                has_default: !matches!(default, rusqlite::types::Value::Null),
                primary_key: row.get::<_, i64>("pk")? != 0,
            })
        })?;

        let mut columns = BTreeMap::new();
        for info in rows {
            let info = info?;
            columns.insert(info.name.clone(), info);
        }
        Ok(TableDescriptor { columns })
    }
}

/// Column metadata for one table, keyed by column name.
///
/// Keys are ordered, so anything derived from a descriptor (such as an
/// insert payload) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct TableDescriptor {
    columns: BTreeMap<String, ColumnInfo>,
}

impl TableDescriptor {
    /// True when the table does not exist
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the table has the given column
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Metadata for one column
    pub fn get(&self, column: &str) -> Option<&ColumnInfo> {
        self.columns.get(column)
    }

    /// Iterate columns in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnInfo)> {
        self.columns.iter()
    }

    /// The auto-assigned rowid alias, when the table has one: a
    /// single-column INTEGER primary key. Composite keys (link tables)
    /// have no auto-assigned column and are regular insert payload.
    pub fn auto_pk(&self) -> Option<&str> {
        let mut pks = self.columns.values().filter(|c| c.primary_key);
        match (pks.next(), pks.next()) {
            (Some(col), None)
                if col
                    .decl_type
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case("integer")) =>
            {
                Some(col.name.as_str())
            }
            _ => None,
        }
    }
}

/// Metadata for a single column
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub decl_type: Option<String>,
    pub notnull: bool,
    pub has_default: bool,
    pub primary_key: bool,
}
