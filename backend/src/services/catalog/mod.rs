//! # Public catalog API
//!
//! Read-only routes used by the storefront. Only visible units are ever
//! returned: sold units and internal stock stay out of every response.
//!
//! - `GET /api/catalog?sort=&model=`: product cards built from the visible
//!   units with the same clustering the client uses, each carrying the
//!   bulletins in force today for its model.
//! - `GET /api/units?model=`: the visible units themselves, for clients that
//!   cluster on their own.
//! - `GET /api/units/{vin}`: one unit with its codes resolved through the
//!   dictionary and its service package offers.

use crate::enrichment::{enrich, Dictionary};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::store::{Store, UnitFilter};
use actix_web::web::{get, scope, Data, Path, Query};
use actix_web::{HttpResponse, Responder, ResponseError, Scope};
use common::grouping::{build_cards, sort_cards};
use common::model::bulletin::Bulletin;
use common::model::catalog::{model_filter_matches, CardSort, ProductCard};
use common::model::dictionary::EnrichedUnit;
use common::model::stock::StockUnit;
use serde::Deserialize;

/// Registered after the admin and auth scopes, which share the prefix.
const API_PATH: &str = "/api";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/catalog", get().to(catalog))
        .route("/units", get().to(units))
        .route("/units/{vin}", get().to(unit))
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    sort: CardSort,
    model: Option<String>,
}

/// Visible units whose model code matches `model` the way the browser
/// filter does.
fn visible_units(store: &Store, model: Option<&str>) -> AppResult<Vec<StockUnit>> {
    let mut units = store.list_units(&UnitFilter {
        include_hidden: false,
    })?;
    if let Some(model) = model {
        units.retain(|u| model_filter_matches(&u.model_code, model));
    }
    Ok(units)
}

/// Attaches the bulletins that apply to each card's model on `today`.
pub fn attach_bulletins(cards: &mut [ProductCard], bulletins: &[Bulletin], today: &str) {
    for card in cards {
        card.bulletins = bulletins
            .iter()
            .filter(|b| b.applies_to(&card.representative.model_code, today))
            .cloned()
            .collect();
    }
}

pub async fn catalog(state: Data<AppState>, query: Query<CatalogQuery>) -> impl Responder {
    match load_catalog(&state, query.into_inner()).await {
        Ok(cards) => HttpResponse::Ok().json(cards),
        Err(e) => e.error_response(),
    }
}

async fn load_catalog(state: &AppState, query: CatalogQuery) -> AppResult<Vec<ProductCard>> {
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    state
        .with_store(move |store| {
            let units = visible_units(store, query.model.as_deref())?;
            let bulletins = store.list_bulletins()?;
            let mut cards = build_cards(&units);
            attach_bulletins(&mut cards, &bulletins, &today);
            sort_cards(&mut cards, query.sort);
            Ok(cards)
        })
        .await
}

pub async fn units(state: Data<AppState>, query: Query<CatalogQuery>) -> impl Responder {
    let model = query.into_inner().model;
    let result: AppResult<Vec<StockUnit>> = state
        .with_store(move |store| visible_units(store, model.as_deref()))
        .await;
    match result {
        Ok(units) => HttpResponse::Ok().json(units),
        Err(e) => e.error_response(),
    }
}

pub async fn unit(state: Data<AppState>, path: Path<String>) -> impl Responder {
    match load_unit(&state, path.into_inner()).await {
        Ok(unit) => HttpResponse::Ok().json(unit),
        Err(e) => e.error_response(),
    }
}

async fn load_unit(state: &AppState, vin: String) -> AppResult<EnrichedUnit> {
    let vin = vin.trim().to_ascii_uppercase();
    state
        .with_store(move |store| {
            let unit = store
                .get_unit(&vin)?
                .filter(|u| u.visible)
                .ok_or_else(|| AppError::NotFound(format!("Unit {}", vin)))?;
            let dictionary = Dictionary::load(store)?;
            let prices = store.list_service_prices()?;
            Ok(enrich(&unit, &dictionary, &prices))
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sync::sync;

    #[test]
    fn test_attach_bulletins_by_model_prefix() {
        let mut a = StockUnit::new("WBA11AA0X0N000001", "main", "21EM");
        a.status_code = 195;
        let b = StockUnit::new("WBA11AA0X0N000002", "main", "31AB");
        let mut cards = build_cards(&[a, b]);

        let bulletins = vec![Bulletin {
            id: 1,
            title: "i4 weeks".to_string(),
            message: String::new(),
            model_prefix: Some("21".to_string()),
            discount_percent: None,
            active: true,
            starts_on: None,
            ends_on: Some("2026-12-31".to_string()),
        }];
        attach_bulletins(&mut cards, &bulletins, "2026-10-19");

        let by_model = |m: &str| {
            cards
                .iter()
                .find(|c| c.representative.model_code == m)
                .map(|c| c.bulletins.len())
        };
        assert_eq!(by_model("21EM"), Some(1));
        assert_eq!(by_model("31AB"), Some(0));

        attach_bulletins(&mut cards, &bulletins, "2027-01-01");
        assert!(cards.iter().all(|c| c.bulletins.is_empty()));
    }

    #[test]
    fn test_visible_units_filter_by_model_prefix() {
        let mut store = Store::open_in_memory().unwrap();
        let mut a = StockUnit::new("WBA11AA0X0N000001", "main", "21EM");
        a.status_code = 195;
        let mut b = a.clone();
        b.vin = "WBA11AA0X0N000002".to_string();
        b.model_code = "31AB".to_string();
        let mut hidden = a.clone();
        hidden.vin = "WBA11AA0X0N000003".to_string();
        hidden.visible = false;
        sync(&mut store, &[a, b, hidden], "main").unwrap();

        let vins = |model: Option<&str>| -> Vec<String> {
            visible_units(&store, model)
                .unwrap()
                .into_iter()
                .map(|u| u.vin)
                .collect()
        };
        assert_eq!(vins(Some(" 21e")), vec!["WBA11AA0X0N000001"]);
        assert_eq!(vins(Some("21EM")), vec!["WBA11AA0X0N000001"]);
        assert_eq!(vins(None).len(), 2);
        assert_eq!(vins(Some("")).len(), 2);
    }
}
