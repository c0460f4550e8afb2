//! Writes parsed units to the store and works out which stored units left
//! the inventory.
//!
//! Groups are always written before units because each unit row references
//! its group id. Both writes share one transaction.

use crate::store::stock::{upsert_group, upsert_unit};
use crate::store::Store;
use common::model::stock::StockUnit;
use common::signature::signature;
use log::{debug, info};
use rayon::prelude::*;
use rusqlite::Result;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Distinct VINs written.
    pub count: usize,
    /// Distinct signatures seen in the batch.
    pub groups: usize,
}

/// Keeps the last occurrence of every VIN, in order of that last occurrence.
pub fn collapse_duplicate_vins(units: &[StockUnit]) -> Vec<StockUnit> {
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (idx, unit) in units.iter().enumerate() {
        last_index.insert(unit.vin.as_str(), idx);
    }
    units
        .iter()
        .enumerate()
        .filter(|(idx, unit)| last_index.get(unit.vin.as_str()) == Some(idx))
        .map(|(_, unit)| unit.clone())
        .collect()
}

/// Upserts one product group per distinct signature and every unit keyed by
/// VIN, tagging each unit with `source`. Running it twice with the same
/// input leaves the store unchanged.
pub fn sync(store: &mut Store, units: &[StockUnit], source: &str) -> Result<SyncSummary> {
    let mut batch = collapse_duplicate_vins(units);
    for unit in batch.iter_mut() {
        unit.source = source.to_string();
    }
    if batch.len() != units.len() {
        debug!(
            "Collapsed {} duplicate VIN rows",
            units.len() - batch.len()
        );
    }

    let signatures: Vec<String> = batch.par_iter().map(signature).collect();

    let tx = store.connection_mut().transaction()?;
    let mut group_ids: HashMap<&str, i64> = HashMap::new();
    for (unit, sig) in batch.iter().zip(&signatures) {
        if !group_ids.contains_key(sig.as_str()) {
            let id = upsert_group(&tx, sig, unit)?;
            group_ids.insert(sig.as_str(), id);
        }
    }

    for (unit, sig) in batch.iter().zip(&signatures) {
        let group_id = group_ids[sig.as_str()];
        upsert_unit(&tx, unit, group_id)?;
    }
    tx.commit()?;

    let summary = SyncSummary {
        count: batch.len(),
        groups: group_ids.len(),
    };
    info!(
        "Synced {} units into {} product groups for source '{}'",
        summary.count, summary.groups, source
    );
    Ok(summary)
}

/// Active units of `source` whose VIN is absent from `new_units`.
pub fn reconcile(store: &Store, new_units: &[StockUnit], source: &str) -> Result<Vec<StockUnit>> {
    let present: HashSet<&str> = new_units.iter().map(|u| u.vin.as_str()).collect();
    let missing: Vec<StockUnit> = store
        .active_units_for_source(source)?
        .into_iter()
        .filter(|u| !present.contains(u.vin.as_str()))
        .collect();
    debug!(
        "Reconciliation for source '{}': {} active units missing from import",
        source,
        missing.len()
    );
    Ok(missing)
}

/// Moves the given units to the terminal sold state.
pub fn mark_sold(store: &mut Store, vins: &[String]) -> Result<usize> {
    let changed = store.mark_sold(vins)?;
    info!("Marked {} units sold", changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_keeps_last_occurrence() {
        let mut first = StockUnit::new("VIN00000000000001", "main", "21EM");
        first.list_price = Some(1.0);
        let other = StockUnit::new("VIN00000000000002", "main", "21EM");
        let mut last = StockUnit::new("VIN00000000000001", "main", "21EM");
        last.list_price = Some(2.0);

        let collapsed = collapse_duplicate_vins(&[first, other, last]);
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed[0].vin, "VIN00000000000002");
        assert_eq!(collapsed[1].list_price, Some(2.0));
    }
}
