use crate::error::{AppError, AppResult};
use crate::import::parser::normalize_vin;
use crate::services::multipart::Parts;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::web::{Data, Json};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use common::requests::{ImagePurgeRequest, ImageUploadResponse};
use serde_json::json;

/// `POST /api/admin/images/upload`: multipart `key` (the VIN) and `file`.
///
/// The image is written under the media directory and its URL appended to
/// the unit's image list.
pub async fn upload(req: HttpRequest, state: Data<AppState>, payload: Multipart) -> impl Responder {
    match upload_image(&req, &state, payload).await {
        Ok(url) => HttpResponse::Ok().json(ImageUploadResponse { url }),
        Err(e) => e.error_response(),
    }
}

async fn upload_image(req: &HttpRequest, state: &AppState, payload: Multipart) -> AppResult<String> {
    state.require_admin(req)?;
    let mut parts = Parts::read(payload).await?;
    let key = String::from_utf8(parts.require("key")?.bytes)
        .map_err(|_| AppError::BadRequest("The image key is not text".into()))?;
    let file = parts.require_file("file")?;

    let vin = normalize_vin(&key)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid image key '{}'", key.trim())))?;

    let media = state.media.clone();
    state
        .with_store(move |store| {
            let mut unit = store
                .get_unit(&vin)?
                .ok_or_else(|| AppError::NotFound(format!("Unit {}", vin)))?;
            let url = media.save_image(&unit.vin, &file.bytes)?;
            unit.images.push(url.clone());
            store.set_unit_images(&unit.vin, &unit.images)?;
            Ok(url)
        })
        .await
}

/// `POST /api/admin/images/purge`: deletes the unit's files and clears its
/// image list.
pub async fn purge(
    req: HttpRequest,
    state: Data<AppState>,
    body: Json<ImagePurgeRequest>,
) -> impl Responder {
    match purge_images(&req, &state, body.into_inner().vin).await {
        Ok(removed) => HttpResponse::Ok().json(json!({ "removed": removed })),
        Err(e) => e.error_response(),
    }
}

async fn purge_images(req: &HttpRequest, state: &AppState, vin: String) -> AppResult<usize> {
    state.require_admin(req)?;
    let vin = normalize_vin(&vin)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid VIN '{}'", vin.trim())))?;
    let media = state.media.clone();
    state
        .with_store(move |store| {
            let removed = media.purge(&vin)?;
            store.set_unit_images(&vin, &[])?;
            Ok(removed)
        })
        .await
}
