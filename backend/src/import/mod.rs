//! Stock import pipeline: parse, sync, reconcile.
//!
//! `run_import` is the single entry point used by the admin import route. It
//! is synchronous and meant to run on the blocking pool.

pub mod dictionary;
pub mod parser;
pub mod sync;

use crate::config::ImportPolicy;
use crate::error::{AppError, AppResult};
use crate::store::Store;
use common::model::import::ImportReport;
use common::requests::ImportRequest;
use log::{info, warn};

/// Whether marking `missing` of `previously_active` units sold needs an
/// explicit `force`.
pub fn exceeds_sold_ratio(missing: usize, previously_active: usize, policy: &ImportPolicy) -> bool {
    if previously_active == 0 || previously_active < policy.min_active_for_ratio_check {
        return false;
    }
    (missing as f64 / previously_active as f64) > policy.max_sold_ratio
}

/// Imports one stock export for `request.source`.
///
/// A file with fatal parse errors is rejected before anything is written.
/// Units of the same source that are absent from the file are marked sold,
/// unless they make up more than `max_sold_ratio` of the source's active
/// inventory and the request does not set `force`; those are reported in
/// `held_back` and left untouched.
pub fn run_import(
    store: &mut Store,
    bytes: &[u8],
    request: &ImportRequest,
    policy: &ImportPolicy,
) -> AppResult<ImportReport> {
    let source = request.source.trim();
    if source.is_empty() {
        return Err(AppError::BadRequest("The import source must not be empty".into()));
    }

    let mut report = ImportReport {
        source: source.to_string(),
        format: request.format,
        file_md5: format!("{:x}", md5::compute(bytes)),
        ..ImportReport::default()
    };

    let outcome = parser::parse_stock(bytes, request.format, source, policy);
    report.header_row = outcome.header_row;
    report.skipped = outcome.skipped.clone();
    if !outcome.errors.is_empty() {
        let message = outcome.errors.join("; ");
        warn!("Import for '{}' rejected: {}", source, message);
        if let Err(e) = store.record_import(&report, &format!("rejected: {}", message)) {
            warn!("Could not record rejected import: {}", e);
        }
        return Err(AppError::Parse(message));
    }
    report.parsed = outcome.units.len();
    info!(
        "Parsed {} units for '{}' ({} skipped, {} hidden)",
        report.parsed,
        source,
        report.skipped.total_skipped(),
        report.skipped.hidden_internal
    );

    let previously_active = store.active_units_for_source(source)?.len();

    let summary = match sync::sync(store, &outcome.units, source) {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(log_err) = store.record_import(&report, &format!("failed: {}", e)) {
                warn!("Could not record failed import: {}", log_err);
            }
            return Err(AppError::Sync(e));
        }
    };
    report.synced = summary.count;
    report.groups = summary.groups;

    let missing: Vec<String> = sync::reconcile(store, &outcome.units, source)?
        .into_iter()
        .map(|u| u.vin)
        .collect();

    if !request.force && exceeds_sold_ratio(missing.len(), previously_active, policy) {
        warn!(
            "Import for '{}' would mark {} of {} active units sold; holding back",
            source,
            missing.len(),
            previously_active
        );
        report.held_back = missing;
    } else if !missing.is_empty() {
        sync::mark_sold(store, &missing)?;
        report.marked_sold = missing;
    }

    let outcome_text = if report.held_back.is_empty() {
        "ok".to_string()
    } else {
        format!("ok, {} held back", report.held_back.len())
    };
    store.record_import(&report, &outcome_text)?;
    Ok(report)
}
