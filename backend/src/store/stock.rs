use super::{decode_list, encode_list, now_rfc3339, Store};
use common::model::stock::{ProductGroup, StockUnit, SOLD_STATUS};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

const UNIT_COLUMNS: &str = "vin, source, status_code, status, processing_type, model_code, \
     color_code, upholstery_code, options, list_price, special_price, currency, visible, \
     production_date, production_year, images, group_id, sold_at";

/// Narrows the unit listing.
#[derive(Debug, Clone, Default)]
pub struct UnitFilter {
    pub include_hidden: bool,
}

fn unit_from_row(row: &Row<'_>) -> Result<StockUnit> {
    Ok(StockUnit {
        vin: row.get(0)?,
        source: row.get(1)?,
        status_code: row.get(2)?,
        status: row.get(3)?,
        processing_type: row.get(4)?,
        model_code: row.get(5)?,
        color_code: row.get(6)?,
        upholstery_code: row.get(7)?,
        options: decode_list(&row.get::<_, String>(8)?),
        list_price: row.get(9)?,
        special_price: row.get(10)?,
        currency: row.get(11)?,
        visible: row.get::<_, i64>(12)? != 0,
        production_date: row.get(13)?,
        production_year: row.get(14)?,
        images: decode_list(&row.get::<_, String>(15)?),
        group_id: row.get(16)?,
        sold_at: row.get(17)?,
    })
}

/// Inserts the group if its signature is new and returns its id either way.
pub(crate) fn upsert_group(conn: &Connection, signature: &str, unit: &StockUnit) -> Result<i64> {
    let options = common::signature::canonical_options(&unit.options);
    conn.execute(
        "INSERT INTO product_group \
         (signature, model_code, color_code, upholstery_code, options, production_year, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
         ON CONFLICT(signature) DO NOTHING",
        params![
            signature,
            unit.model_code.trim().to_ascii_uppercase(),
            unit.color_code.trim().to_ascii_uppercase(),
            unit.upholstery_code.trim().to_ascii_uppercase(),
            encode_list(&options),
            unit.production_year,
            now_rfc3339(),
        ],
    )?;
    conn.query_row(
        "SELECT id FROM product_group WHERE signature = ?1",
        params![signature],
        |row| row.get(0),
    )
}

/// Inserts or updates a unit keyed by VIN.
///
/// Images and the creation timestamp are never touched by an import. A unit
/// already marked sold keeps its status, status code and visibility. A unit
/// curated by hand keeps its prices and visibility. Rows the source reports
/// as sold get `sold_at` like units retired by `mark_sold`.
pub(crate) fn upsert_unit(conn: &Connection, unit: &StockUnit, group_id: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO stock_unit \
         (vin, source, status_code, status, processing_type, model_code, color_code, \
          upholstery_code, options, list_price, special_price, currency, visible, \
          production_date, production_year, images, group_id, sold_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, '[]', ?16, \
                 CASE WHEN ?4 = ?18 THEN ?17 END, ?17) \
         ON CONFLICT(vin) DO UPDATE SET \
           source = excluded.source, \
           status_code = CASE WHEN stock_unit.status = ?18 THEN stock_unit.status_code ELSE excluded.status_code END, \
           status = CASE WHEN stock_unit.status = ?18 THEN stock_unit.status ELSE excluded.status END, \
           visible = CASE \
             WHEN stock_unit.status = ?18 THEN stock_unit.visible \
             WHEN excluded.status = ?18 THEN 0 \
             WHEN stock_unit.curated_at IS NOT NULL THEN stock_unit.visible \
             ELSE excluded.visible END, \
           sold_at = COALESCE(stock_unit.sold_at, CASE WHEN excluded.status = ?18 THEN ?17 END), \
           processing_type = excluded.processing_type, \
           model_code = excluded.model_code, \
           color_code = excluded.color_code, \
           upholstery_code = excluded.upholstery_code, \
           options = excluded.options, \
           list_price = CASE WHEN stock_unit.curated_at IS NULL THEN excluded.list_price ELSE stock_unit.list_price END, \
           special_price = CASE WHEN stock_unit.curated_at IS NULL THEN excluded.special_price ELSE stock_unit.special_price END, \
           currency = excluded.currency, \
           production_date = excluded.production_date, \
           production_year = excluded.production_year, \
           group_id = excluded.group_id",
        params![
            unit.vin,
            unit.source,
            unit.status_code,
            unit.status,
            unit.processing_type,
            unit.model_code,
            unit.color_code,
            unit.upholstery_code,
            encode_list(&unit.options),
            unit.list_price,
            unit.special_price,
            unit.currency,
            unit.visible as i64,
            unit.production_date,
            unit.production_year,
            group_id,
            now_rfc3339(),
            SOLD_STATUS,
        ],
    )?;
    Ok(())
}

impl Store {
    pub fn get_unit(&self, vin: &str) -> Result<Option<StockUnit>> {
        self.connection()
            .query_row(
                &format!("SELECT {} FROM stock_unit WHERE vin = ?1", UNIT_COLUMNS),
                params![vin],
                unit_from_row,
            )
            .optional()
    }

    /// Units for the catalog, ordered by VIN so clustering is deterministic.
    pub fn list_units(&self, filter: &UnitFilter) -> Result<Vec<StockUnit>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM stock_unit \
             WHERE (?1 OR visible = 1) ORDER BY vin",
            UNIT_COLUMNS
        ))?;
        let units = stmt
            .query_map(params![filter.include_hidden], unit_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(units)
    }

    /// Units of `source` that are not in the terminal sold state.
    pub fn active_units_for_source(&self, source: &str) -> Result<Vec<StockUnit>> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM stock_unit WHERE source = ?1 AND status <> ?2 ORDER BY vin",
            UNIT_COLUMNS
        ))?;
        let units = stmt
            .query_map(params![source, SOLD_STATUS], unit_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(units)
    }

    pub fn count_units(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM stock_unit", [], |row| row.get(0))
    }

    pub fn count_groups(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM product_group", [], |row| row.get(0))
    }

    pub fn get_group(&self, id: i64) -> Result<Option<ProductGroup>> {
        self.connection()
            .query_row(
                "SELECT id, signature, model_code, color_code, upholstery_code, options, \
                 production_year FROM product_group WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ProductGroup {
                        id: row.get(0)?,
                        signature: row.get(1)?,
                        model_code: row.get(2)?,
                        color_code: row.get(3)?,
                        upholstery_code: row.get(4)?,
                        options: decode_list(&row.get::<_, String>(5)?),
                        production_year: row.get(6)?,
                    })
                },
            )
            .optional()
    }

    /// Terminal transition: status to the sold marker, hidden, timestamped.
    pub fn mark_sold(&mut self, vins: &[String]) -> Result<usize> {
        let now = now_rfc3339();
        let tx = self.connection_mut().transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(
                "UPDATE stock_unit SET status = ?1, visible = 0, sold_at = ?2 \
                 WHERE vin = ?3 AND status <> ?1",
            )?;
            for vin in vins {
                changed += stmt.execute(params![SOLD_STATUS, now, vin])?;
            }
        }
        tx.commit()?;
        Ok(changed)
    }

    /// Writes the fields an administrator may curate by hand and marks the
    /// unit curated, so later imports leave its prices and visibility alone.
    pub fn update_unit(&self, unit: &StockUnit) -> Result<usize> {
        self.connection().execute(
            "UPDATE stock_unit SET list_price = ?1, special_price = ?2, status = ?3, \
             status_code = ?4, visible = ?5, sold_at = ?6, curated_at = ?7 WHERE vin = ?8",
            params![
                unit.list_price,
                unit.special_price,
                unit.status,
                unit.status_code,
                unit.visible as i64,
                unit.sold_at,
                now_rfc3339(),
                unit.vin,
            ],
        )
    }

    pub fn set_unit_images(&self, vin: &str, images: &[String]) -> Result<usize> {
        self.connection().execute(
            "UPDATE stock_unit SET images = ?1 WHERE vin = ?2",
            params![encode_list(images), vin],
        )
    }

    pub fn delete_unit(&self, vin: &str) -> Result<usize> {
        self.connection()
            .execute("DELETE FROM stock_unit WHERE vin = ?1", params![vin])
    }
}
