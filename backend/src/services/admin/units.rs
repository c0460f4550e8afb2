use crate::error::{AppError, AppResult};
use crate::import::parser::normalize_vin;
use crate::state::AppState;
use crate::store::now_rfc3339;
use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::stock::{StockUnit, SOLD_STATUS};
use common::requests::UnitPatch;
use log::info;
use serde_json::json;

fn valid_price(price: Option<f64>) -> AppResult<()> {
    match price {
        Some(p) if !p.is_finite() || p < 0.0 => Err(AppError::BadRequest(format!(
            "{} is not a valid price",
            p
        ))),
        _ => Ok(()),
    }
}

/// Applies a manual edit. Selling a unit hides it. Reverting a sale clears
/// `sold_at` but leaves the unit hidden unless the patch sets `visible`.
fn apply_patch(mut unit: StockUnit, patch: &UnitPatch) -> AppResult<StockUnit> {
    valid_price(patch.list_price)?;
    valid_price(patch.special_price)?;

    if let Some(price) = patch.list_price {
        unit.list_price = Some(price);
    }
    if patch.clear_special_price {
        unit.special_price = None;
    } else if let Some(price) = patch.special_price {
        unit.special_price = Some(price);
    }
    if let Some(visible) = patch.visible {
        unit.visible = visible;
    }
    if let Some(code) = patch.status_code {
        unit.status_code = code;
    }
    if let Some(status) = patch.status.as_deref().map(str::trim) {
        if status.is_empty() {
            return Err(AppError::BadRequest("Status must not be empty".into()));
        }
        let sold = status.eq_ignore_ascii_case(SOLD_STATUS);
        if unit.is_sold() && !sold {
            info!("Sale of {} reverted manually", unit.vin);
            unit.sold_at = None;
        }
        unit.status = if sold {
            SOLD_STATUS.to_string()
        } else {
            status.to_string()
        };
    }
    if unit.is_sold() {
        unit.visible = false;
        if unit.sold_at.is_none() {
            unit.sold_at = Some(now_rfc3339());
        }
    }
    Ok(unit)
}

fn path_vin(raw: &str) -> AppResult<String> {
    normalize_vin(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid VIN '{}'", raw)))
}

/// `PATCH /api/admin/units/{vin}`: returns the updated unit.
pub async fn update(
    req: HttpRequest,
    state: Data<AppState>,
    path: Path<String>,
    body: Json<UnitPatch>,
) -> impl Responder {
    match update_unit(&req, &state, path.into_inner(), body.into_inner()).await {
        Ok(unit) => HttpResponse::Ok().json(unit),
        Err(e) => e.error_response(),
    }
}

async fn update_unit(
    req: &HttpRequest,
    state: &AppState,
    vin: String,
    patch: UnitPatch,
) -> AppResult<StockUnit> {
    state.require_admin(req)?;
    let vin = path_vin(&vin)?;
    state
        .with_store(move |store| {
            let unit = store
                .get_unit(&vin)?
                .ok_or_else(|| AppError::NotFound(format!("Unit {}", vin)))?;
            let unit = apply_patch(unit, &patch)?;
            store.update_unit(&unit)?;
            info!("Unit {} curated manually", vin);
            Ok(unit)
        })
        .await
}

/// `DELETE /api/admin/units/{vin}`: removes the unit and its stored images.
pub async fn purge(req: HttpRequest, state: Data<AppState>, path: Path<String>) -> impl Responder {
    match purge_unit(&req, &state, path.into_inner()).await {
        Ok((vin, images_removed)) => {
            HttpResponse::Ok().json(json!({ "vin": vin, "images_removed": images_removed }))
        }
        Err(e) => e.error_response(),
    }
}

async fn purge_unit(req: &HttpRequest, state: &AppState, vin: String) -> AppResult<(String, usize)> {
    state.require_admin(req)?;
    let vin = path_vin(&vin)?;
    let media = state.media.clone();
    state
        .with_store(move |store| {
            // Files before the row: a failed file delete leaves the unit in place.
            let images_removed = media.purge(&vin)?;
            let removed = store.delete_unit(&vin)?;
            if removed == 0 && images_removed == 0 {
                return Err(AppError::NotFound(format!("Unit {}", vin)));
            }
            info!("Purged unit {} ({} images)", vin, images_removed);
            Ok((vin, images_removed))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> StockUnit {
        let mut u = StockUnit::new("WBA11AA0X0N000001", "main", "21EM");
        u.status_code = 195;
        u.status = "in stock".to_string();
        u.list_price = Some(50_000.0);
        u.special_price = Some(47_500.0);
        u
    }

    #[test]
    fn test_patch_prices() {
        let patch = UnitPatch {
            list_price: Some(49_000.0),
            clear_special_price: true,
            special_price: Some(1.0),
            ..UnitPatch::default()
        };
        let u = apply_patch(unit(), &patch).unwrap();
        assert_eq!(u.list_price, Some(49_000.0));
        assert_eq!(u.special_price, None);
        assert!(matches!(
            apply_patch(
                unit(),
                &UnitPatch {
                    list_price: Some(-1.0),
                    ..UnitPatch::default()
                }
            ),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_selling_hides_and_revert_keeps_hidden() {
        let sold = apply_patch(
            unit(),
            &UnitPatch {
                status: Some("Sold".to_string()),
                visible: Some(true),
                ..UnitPatch::default()
            },
        )
        .unwrap();
        assert!(sold.is_sold());
        assert!(!sold.visible);
        assert!(sold.sold_at.is_some());

        let reverted = apply_patch(
            sold,
            &UnitPatch {
                status: Some("in stock".to_string()),
                ..UnitPatch::default()
            },
        )
        .unwrap();
        assert!(!reverted.is_sold());
        assert!(reverted.sold_at.is_none());
        assert!(!reverted.visible);
    }
}
