//! HTTP routes. Each sub-module exposes `configure_routes()` returning its
//! actix `Scope`.

use actix_web::web::ServiceConfig;

pub mod admin;
pub mod auth;
pub mod catalog;
mod multipart;

/// Registers every API scope. `catalog` owns the bare `/api` prefix, so it
/// must come after the more specific scopes.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(auth::configure_routes())
        .service(admin::configure_routes())
        .service(catalog::configure_routes());
}
