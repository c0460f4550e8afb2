use super::Store;
use common::model::bulletin::Bulletin;
use rusqlite::{params, OptionalExtension, Result, Row};

fn bulletin_from_row(row: &Row<'_>) -> Result<Bulletin> {
    Ok(Bulletin {
        id: row.get(0)?,
        title: row.get(1)?,
        message: row.get(2)?,
        model_prefix: row.get(3)?,
        discount_percent: row.get(4)?,
        active: row.get::<_, i64>(5)? != 0,
        starts_on: row.get(6)?,
        ends_on: row.get(7)?,
    })
}

impl Store {
    pub fn list_bulletins(&self) -> Result<Vec<Bulletin>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, title, message, model_prefix, discount_percent, active, starts_on, ends_on \
             FROM bulletin ORDER BY id",
        )?;
        let bulletins = stmt
            .query_map([], bulletin_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(bulletins)
    }

    pub fn get_bulletin(&self, id: i64) -> Result<Option<Bulletin>> {
        self.connection()
            .query_row(
                "SELECT id, title, message, model_prefix, discount_percent, active, starts_on, \
                 ends_on FROM bulletin WHERE id = ?1",
                params![id],
                bulletin_from_row,
            )
            .optional()
    }

    pub fn insert_bulletin(&self, bulletin: &Bulletin) -> Result<i64> {
        self.connection().execute(
            "INSERT INTO bulletin \
             (title, message, model_prefix, discount_percent, active, starts_on, ends_on) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                bulletin.title,
                bulletin.message,
                bulletin.model_prefix,
                bulletin.discount_percent,
                bulletin.active as i64,
                bulletin.starts_on,
                bulletin.ends_on,
            ],
        )?;
        Ok(self.connection().last_insert_rowid())
    }

    pub fn update_bulletin(&self, id: i64, bulletin: &Bulletin) -> Result<usize> {
        self.connection().execute(
            "UPDATE bulletin SET title = ?1, message = ?2, model_prefix = ?3, \
             discount_percent = ?4, active = ?5, starts_on = ?6, ends_on = ?7 WHERE id = ?8",
            params![
                bulletin.title,
                bulletin.message,
                bulletin.model_prefix,
                bulletin.discount_percent,
                bulletin.active as i64,
                bulletin.starts_on,
                bulletin.ends_on,
                id,
            ],
        )
    }

    pub fn delete_bulletin(&self, id: i64) -> Result<usize> {
        self.connection()
            .execute("DELETE FROM bulletin WHERE id = ?1", params![id])
    }
}
