use super::{now_rfc3339, Store};
use common::model::import::{ImportLogEntry, ImportReport};
use rusqlite::{params, Result};

impl Store {
    pub fn record_import(&self, report: &ImportReport, outcome: &str) -> Result<i64> {
        self.connection().execute(
            "INSERT INTO import_log \
             (source, format, file_md5, started_at, parsed, synced, marked_sold, held_back, outcome) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.source,
                report.format.to_string(),
                report.file_md5,
                now_rfc3339(),
                report.parsed as i64,
                report.synced as i64,
                report.marked_sold.len() as i64,
                report.held_back.len() as i64,
                outcome,
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    /// Most recent imports first.
    pub fn list_imports(&self, limit: i64) -> Result<Vec<ImportLogEntry>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, source, format, file_md5, started_at, parsed, synced, marked_sold, \
             held_back, outcome FROM import_log ORDER BY id DESC LIMIT ?1",
        )?;
        let entries = stmt
            .query_map(params![limit], |row| {
                let format: String = row.get(2)?;
                Ok(ImportLogEntry {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    format: format.parse().unwrap_or_default(),
                    file_md5: row.get(3)?,
                    started_at: row.get(4)?,
                    parsed: row.get::<_, i64>(5)? as usize,
                    synced: row.get::<_, i64>(6)? as usize,
                    marked_sold: row.get::<_, i64>(7)? as usize,
                    held_back: row.get::<_, i64>(8)? as usize,
                    outcome: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }
}
