use super::Store;
use common::model::dictionary::{DictionaryEntry, DictionaryKind, ServicePrice};
use rusqlite::{params, Result, Row};

fn entry_from_row(row: &Row<'_>) -> Result<DictionaryEntry> {
    let kind: String = row.get(0)?;
    let attributes: String = row.get(3)?;
    Ok(DictionaryEntry {
        kind: kind.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                e.into(),
            )
        })?,
        code: row.get(1)?,
        name: row.get(2)?,
        attributes: serde_json::from_str(&attributes).unwrap_or(serde_json::Value::Null),
    })
}

fn price_from_row(row: &Row<'_>) -> Result<ServicePrice> {
    Ok(ServicePrice {
        package: row.get(0)?,
        series_code: row.get(1)?,
        price: row.get(2)?,
        currency: row.get(3)?,
        duration_months: row.get(4)?,
        mileage_km: row.get(5)?,
    })
}

impl Store {
    pub fn list_dictionary(&self, kind: Option<DictionaryKind>) -> Result<Vec<DictionaryEntry>> {
        let mut stmt = self.connection().prepare(
            "SELECT kind, code, name, attributes FROM dictionary \
             WHERE ?1 IS NULL OR kind = ?1 ORDER BY kind, code",
        )?;
        let entries = stmt
            .query_map(params![kind.map(|k| k.as_str())], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn upsert_dictionary_entry(&self, entry: &DictionaryEntry) -> Result<()> {
        self.connection().execute(
            "INSERT INTO dictionary (kind, code, name, attributes) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(kind, code) DO UPDATE SET name = excluded.name, \
             attributes = excluded.attributes",
            params![
                entry.kind.as_str(),
                entry.code.trim().to_ascii_uppercase(),
                entry.name,
                entry.attributes.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Upserts a batch of entries in one transaction.
    pub fn upsert_dictionary_entries(&mut self, entries: &[DictionaryEntry]) -> Result<usize> {
        let tx = self.connection_mut().transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO dictionary (kind, code, name, attributes) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(kind, code) DO UPDATE SET name = excluded.name, \
                 attributes = excluded.attributes",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.kind.as_str(),
                    entry.code.trim().to_ascii_uppercase(),
                    entry.name,
                    entry.attributes.to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(entries.len())
    }

    pub fn delete_dictionary_entry(&self, kind: DictionaryKind, code: &str) -> Result<usize> {
        self.connection().execute(
            "DELETE FROM dictionary WHERE kind = ?1 AND code = ?2",
            params![kind.as_str(), code.trim().to_ascii_uppercase()],
        )
    }

    pub fn list_service_prices(&self) -> Result<Vec<ServicePrice>> {
        let mut stmt = self.connection().prepare(
            "SELECT package, series_code, price, currency, duration_months, mileage_km \
             FROM service_price ORDER BY package, series_code",
        )?;
        let prices = stmt
            .query_map([], price_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(prices)
    }

    pub fn upsert_service_price(&self, price: &ServicePrice) -> Result<()> {
        self.connection().execute(
            "INSERT INTO service_price \
             (package, series_code, price, currency, duration_months, mileage_km) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(package, series_code) DO UPDATE SET price = excluded.price, \
             currency = excluded.currency, duration_months = excluded.duration_months, \
             mileage_km = excluded.mileage_km",
            params![
                price.package.trim().to_ascii_uppercase(),
                price.series_code.trim().to_ascii_uppercase(),
                price.price,
                price.currency,
                price.duration_months,
                price.mileage_km,
            ],
        )?;
        Ok(())
    }

    pub fn delete_service_price(&self, package: &str, series_code: &str) -> Result<usize> {
        self.connection().execute(
            "DELETE FROM service_price WHERE package = ?1 AND series_code = ?2",
            params![
                package.trim().to_ascii_uppercase(),
                series_code.trim().to_ascii_uppercase()
            ],
        )
    }
}
