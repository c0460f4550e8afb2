use crate::error::{AppError, AppResult};
use crate::import::dictionary::parse_dictionary;
use crate::services::multipart::Parts;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::dictionary::{DictionaryEntry, DictionaryKind};
use common::requests::DictionaryImportResponse;
use log::info;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    kind: Option<String>,
}

fn parse_kind(raw: &str) -> AppResult<DictionaryKind> {
    raw.parse::<DictionaryKind>().map_err(AppError::BadRequest)
}

pub async fn list(req: HttpRequest, state: Data<AppState>, query: Query<KindQuery>) -> impl Responder {
    match list_entries(&req, &state, query.into_inner()).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => e.error_response(),
    }
}

async fn list_entries(
    req: &HttpRequest,
    state: &AppState,
    query: KindQuery,
) -> AppResult<Vec<DictionaryEntry>> {
    state.require_admin(req)?;
    let kind = query.kind.as_deref().map(parse_kind).transpose()?;
    state
        .with_store(move |store| Ok(store.list_dictionary(kind)?))
        .await
}

pub async fn upsert(
    req: HttpRequest,
    state: Data<AppState>,
    body: Json<DictionaryEntry>,
) -> impl Responder {
    match save_entry(&req, &state, body.into_inner()).await {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => e.error_response(),
    }
}

async fn save_entry(
    req: &HttpRequest,
    state: &AppState,
    mut entry: DictionaryEntry,
) -> AppResult<DictionaryEntry> {
    state.require_admin(req)?;
    entry.code = entry.code.trim().to_ascii_uppercase();
    if entry.code.is_empty() {
        return Err(AppError::BadRequest("Dictionary code must not be empty".into()));
    }
    if !(entry.attributes.is_object() || entry.attributes.is_array() || entry.attributes.is_null())
    {
        return Err(AppError::BadRequest(
            "Attributes must be an object or an array of variants".into(),
        ));
    }
    state
        .with_store(move |store| {
            store.upsert_dictionary_entry(&entry)?;
            Ok(entry)
        })
        .await
}

pub async fn remove(
    req: HttpRequest,
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> impl Responder {
    let (kind, code) = path.into_inner();
    match delete_entry(&req, &state, kind, code).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

async fn delete_entry(
    req: &HttpRequest,
    state: &AppState,
    kind: String,
    code: String,
) -> AppResult<()> {
    state.require_admin(req)?;
    let kind = parse_kind(&kind)?;
    let removed = state
        .with_store(move |store| Ok(store.delete_dictionary_entry(kind, &code)?))
        .await?;
    if removed == 0 {
        return Err(AppError::NotFound("No such dictionary entry".into()));
    }
    Ok(())
}

/// `POST /api/admin/dictionary/import`: multipart `file` with one entry per
/// row. Unknown types and blank codes are counted as skipped.
pub async fn bulk_import(
    req: HttpRequest,
    state: Data<AppState>,
    payload: Multipart,
) -> impl Responder {
    match import_entries(&req, &state, payload).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

async fn import_entries(
    req: &HttpRequest,
    state: &AppState,
    payload: Multipart,
) -> AppResult<DictionaryImportResponse> {
    state.require_admin(req)?;
    let file = Parts::read(payload).await?.require_file("file")?;
    let upload = parse_dictionary(&file.bytes)?;
    info!(
        "Dictionary upload {:?}: {} entries, {} skipped",
        file.filename,
        upload.entries.len(),
        upload.skipped
    );
    let skipped = upload.skipped;
    let imported = state
        .with_store(move |store| Ok(store.upsert_dictionary_entries(&upload.entries)?))
        .await?;
    Ok(DictionaryImportResponse { imported, skipped })
}
