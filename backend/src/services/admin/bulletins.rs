use crate::error::{AppError, AppResult};
use crate::state::AppState;
use actix_web::web::{Data, Json, Path};
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError};
use chrono::NaiveDate;
use common::model::bulletin::Bulletin;

fn validate(bulletin: &Bulletin) -> AppResult<()> {
    if bulletin.title.trim().is_empty() {
        return Err(AppError::BadRequest("Bulletin title must not be empty".into()));
    }
    for date in [&bulletin.starts_on, &bulletin.ends_on].into_iter().flatten() {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            AppError::BadRequest(format!("'{}' is not a YYYY-MM-DD date", date))
        })?;
    }
    if let (Some(start), Some(end)) = (&bulletin.starts_on, &bulletin.ends_on) {
        if end < start {
            return Err(AppError::BadRequest("Bulletin ends before it starts".into()));
        }
    }
    if let Some(discount) = bulletin.discount_percent {
        if !(0.0..=100.0).contains(&discount) {
            return Err(AppError::BadRequest(
                "Discount must be between 0 and 100 percent".into(),
            ));
        }
    }
    Ok(())
}

pub async fn list(req: HttpRequest, state: Data<AppState>) -> impl Responder {
    let result = match state.require_admin(&req) {
        Ok(()) => state.with_store(|store| Ok(store.list_bulletins()?)).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(bulletins) => HttpResponse::Ok().json(bulletins),
        Err(e) => e.error_response(),
    }
}

pub async fn create(req: HttpRequest, state: Data<AppState>, body: Json<Bulletin>) -> impl Responder {
    match create_bulletin(&req, &state, body.into_inner()).await {
        Ok(bulletin) => HttpResponse::Created().json(bulletin),
        Err(e) => e.error_response(),
    }
}

async fn create_bulletin(
    req: &HttpRequest,
    state: &AppState,
    mut bulletin: Bulletin,
) -> AppResult<Bulletin> {
    state.require_admin(req)?;
    validate(&bulletin)?;
    state
        .with_store(move |store| {
            bulletin.id = store.insert_bulletin(&bulletin)?;
            Ok(bulletin)
        })
        .await
}

pub async fn update(
    req: HttpRequest,
    state: Data<AppState>,
    path: Path<i64>,
    body: Json<Bulletin>,
) -> impl Responder {
    match update_bulletin(&req, &state, path.into_inner(), body.into_inner()).await {
        Ok(bulletin) => HttpResponse::Ok().json(bulletin),
        Err(e) => e.error_response(),
    }
}

async fn update_bulletin(
    req: &HttpRequest,
    state: &AppState,
    id: i64,
    mut bulletin: Bulletin,
) -> AppResult<Bulletin> {
    state.require_admin(req)?;
    validate(&bulletin)?;
    bulletin.id = id;
    state
        .with_store(move |store| {
            if store.update_bulletin(id, &bulletin)? == 0 {
                return Err(AppError::NotFound(format!("Bulletin {}", id)));
            }
            Ok(bulletin)
        })
        .await
}

pub async fn remove(req: HttpRequest, state: Data<AppState>, path: Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let result = match state.require_admin(&req) {
        Ok(()) => {
            state
                .with_store(move |store| match store.delete_bulletin(id)? {
                    0 => Err(AppError::NotFound(format!("Bulletin {}", id))),
                    _ => Ok(()),
                })
                .await
        }
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulletin() -> Bulletin {
        Bulletin {
            id: 0,
            title: "Winter offer".to_string(),
            message: String::new(),
            model_prefix: Some("21".to_string()),
            discount_percent: Some(5.0),
            active: true,
            starts_on: Some("2026-01-01".to_string()),
            ends_on: Some("2026-03-31".to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_bulletin() {
        assert!(validate(&bulletin()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let mut b = bulletin();
        b.title = "  ".to_string();
        assert!(validate(&b).is_err());

        let mut b = bulletin();
        b.ends_on = Some("2025-12-31".to_string());
        assert!(validate(&b).is_err());

        let mut b = bulletin();
        b.starts_on = Some("01.01.2026".to_string());
        assert!(validate(&b).is_err());

        let mut b = bulletin();
        b.discount_percent = Some(120.0);
        assert!(validate(&b).is_err());
    }
}
