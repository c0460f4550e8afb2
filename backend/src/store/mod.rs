//! SQLite persistence for stock, product groups, dictionaries, service
//! prices, bulletins and the import log.
//!
//! `Store` owns a single connection. Query methods are spread over the
//! sub-modules as `impl Store` blocks, one per table family.

mod bulletins;
mod dictionary;
mod imports;
pub(crate) mod stock;

use log::{debug, info};
use rusqlite::{Connection, Result};

pub use stock::UnitFilter;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Store { conn };
        store.configure_pragmas(true)?;
        store.migrate_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Store { conn };
        store.configure_pragmas(false)?;
        store.migrate_schema()?;
        Ok(store)
    }

    fn configure_pragmas(&self, on_disk: bool) -> Result<()> {
        if on_disk {
            self.conn
                .execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        }
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
        debug!("SQLite pragmas configured");
        Ok(())
    }

    fn migrate_schema(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        self.add_column_if_missing("stock_unit", "curated_at", "TEXT")?;
        debug!("SQLite schema initialized");
        Ok(())
    }

    /// Brings databases created before a column existed up to date.
    fn add_column_if_missing(&self, table: &str, column: &str, decl: &str) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))?;
        let present = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>>>()?
            .iter()
            .any(|name| name == column);
        if !present {
            self.conn.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                table, column, decl
            ))?;
            info!("Added column {}.{}", table, column);
        }
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Option codes and image URLs are stored as JSON arrays.
pub(crate) fn encode_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

pub(crate) fn decode_list(text: &str) -> Vec<String> {
    serde_json::from_str(text).unwrap_or_default()
}
