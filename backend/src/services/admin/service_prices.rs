use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use common::model::dictionary::ServicePrice;

pub async fn list(req: HttpRequest, state: Data<AppState>) -> impl Responder {
    let result = match state.require_admin(&req) {
        Ok(()) => {
            state
                .with_store(|store| Ok(store.list_service_prices()?))
                .await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(prices) => HttpResponse::Ok().json(prices),
        Err(e) => e.error_response(),
    }
}

pub async fn upsert(
    req: HttpRequest,
    state: Data<AppState>,
    body: Json<ServicePrice>,
) -> impl Responder {
    match save_price(&req, &state, body.into_inner()).await {
        Ok(price) => HttpResponse::Ok().json(price),
        Err(e) => e.error_response(),
    }
}

async fn save_price(
    req: &HttpRequest,
    state: &AppState,
    mut price: ServicePrice,
) -> AppResult<ServicePrice> {
    state.require_admin(req)?;
    price.package = price.package.trim().to_ascii_uppercase();
    price.series_code = price.series_code.trim().to_ascii_uppercase();
    if price.package.is_empty() || price.series_code.is_empty() {
        return Err(AppError::BadRequest(
            "Package and series code must not be empty".into(),
        ));
    }
    if !price.price.is_finite() || price.price < 0.0 {
        return Err(AppError::BadRequest("Price must be a positive number".into()));
    }
    state
        .with_store(move |store| {
            store.upsert_service_price(&price)?;
            Ok(price)
        })
        .await
}

pub async fn remove(
    req: HttpRequest,
    state: Data<AppState>,
    path: Path<(String, String)>,
) -> impl Responder {
    let (package, series) = path.into_inner();
    match delete_price(&req, &state, package, series).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

async fn delete_price(
    req: &HttpRequest,
    state: &AppState,
    package: String,
    series: String,
) -> AppResult<()> {
    state.require_admin(req)?;
    let removed = state
        .with_store(move |store| Ok(store.delete_service_price(&package, &series)?))
        .await?;
    if removed == 0 {
        return Err(AppError::NotFound("No such service price".into()));
    }
    Ok(())
}
