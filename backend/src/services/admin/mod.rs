//! # Admin API
//!
//! Every route under `/api/admin` requires the `X-Admin-Password` header to
//! match the configured admin password; otherwise it answers `401` with a
//! JSON error body. Handlers follow one pattern: a public `process`-style
//! wrapper turns the `AppResult` of an inner function into a response, and
//! all store work runs on the blocking pool through `AppState::with_store`.
//!
//! ## Sub-modules
//! - `import`: stock export upload and the import log.
//! - `dictionary`: dictionary entries, one by one or as a bulk file.
//! - `service_prices`: service package prices per body group.
//! - `units`: manual curation and removal of single units.
//! - `images`: unit photos on disk.
//! - `bulletins`: promotional notes shown on catalog cards.

use actix_web::web::{delete, get, patch, post, put, scope};
use actix_web::Scope;

mod bulletins;
mod dictionary;
mod images;
mod import;
mod service_prices;
mod units;

const API_PATH: &str = "/api/admin";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/import", post().to(import::process))
        .route("/imports", get().to(import::history))
        .route("/dictionary", get().to(dictionary::list))
        .route("/dictionary", put().to(dictionary::upsert))
        .route("/dictionary/import", post().to(dictionary::bulk_import))
        .route("/dictionary/{kind}/{code}", delete().to(dictionary::remove))
        .route("/service-prices", get().to(service_prices::list))
        .route("/service-prices", put().to(service_prices::upsert))
        .route(
            "/service-prices/{package}/{series}",
            delete().to(service_prices::remove),
        )
        .route("/units/{vin}", patch().to(units::update))
        .route("/units/{vin}", delete().to(units::purge))
        .route("/images/upload", post().to(images::upload))
        .route("/images/purge", post().to(images::purge))
        .route("/bulletins", get().to(bulletins::list))
        .route("/bulletins", post().to(bulletins::create))
        .route("/bulletins/{id}", put().to(bulletins::update))
        .route("/bulletins/{id}", delete().to(bulletins::remove))
}
