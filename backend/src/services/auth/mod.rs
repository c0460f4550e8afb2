//! Admin password check used by the admin UI before it unlocks its forms.
//!
//! - `POST /api/auth/check`: takes `{password}` and answers `{ok}`. A wrong
//!   password is not an error, the client just stays locked.

use crate::state::AppState;
use actix_web::web::{post, scope, Data, Json};
use actix_web::{HttpResponse, Responder, Scope};
use common::requests::{AuthCheckRequest, AuthCheckResponse};
use log::warn;

const API_PATH: &str = "/api/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/check", post().to(process))
}

pub async fn process(state: Data<AppState>, body: Json<AuthCheckRequest>) -> impl Responder {
    let ok = state.password_matches(&body.password);
    if !ok {
        warn!("Rejected admin password check");
    }
    HttpResponse::Ok().json(AuthCheckResponse { ok })
}
