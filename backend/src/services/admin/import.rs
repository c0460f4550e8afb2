use crate::error::AppResult;
use crate::import::run_import;
use crate::services::multipart::Parts;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::web::{Data, Query};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::import::{ImportLogEntry, ImportReport};
use common::requests::ImportRequest;
use log::info;
use serde::Deserialize;

const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// `POST /api/admin/import`
///
/// - On success: `200 OK` with the `ImportReport`.
/// - A rejected file answers `400` and leaves the store untouched.
pub async fn process(req: HttpRequest, state: Data<AppState>, payload: Multipart) -> impl Responder {
    match import_stock(&req, &state, payload).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => e.error_response(),
    }
}

/// Reads the `json` metadata part and the `file` part, then runs the whole
/// import on the blocking pool.
async fn import_stock(
    req: &HttpRequest,
    state: &AppState,
    payload: Multipart,
) -> AppResult<ImportReport> {
    state.require_admin(req)?;

    let mut parts = Parts::read(payload).await?;
    let request: ImportRequest = serde_json::from_slice(&parts.require("json")?.bytes)?;
    let file = parts.require_file("file")?;
    info!(
        "Import upload for '{}' ({}, {} bytes, file {:?})",
        request.source,
        request.format,
        file.bytes.len(),
        file.filename
    );

    let policy = state.config.import.clone();
    state
        .with_store(move |store| run_import(store, &file.bytes, &request, &policy))
        .await
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

/// `GET /api/admin/imports?limit=`
pub async fn history(
    req: HttpRequest,
    state: Data<AppState>,
    query: Query<HistoryQuery>,
) -> impl Responder {
    match load_history(&req, &state, query.limit).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => e.error_response(),
    }
}

async fn load_history(
    req: &HttpRequest,
    state: &AppState,
    limit: Option<i64>,
) -> AppResult<Vec<ImportLogEntry>> {
    state.require_admin(req)?;
    let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
    state
        .with_store(move |store| Ok(store.list_imports(limit)?))
        .await
}
