use actix_files::Files;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use backend::config::load_configuration;
use backend::error::AppError;
use backend::services;
use backend::state::AppState;
use backend::store::Store;
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info, warn};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

/// Serves the bundled frontend. Unknown paths fall back to `index.html` so
/// client-side routes survive a reload.
async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config =
        load_configuration().inspect_err(|e| error!("Invalid configuration: {}", e))?;
    if config.admin_password == "changeme" {
        warn!("The admin password is still the default, set SHOWROOM_ADMIN_PASSWORD");
    }

    let store = Store::open(&config.database_path)
        .inspect_err(|e| error!("Cannot open database {}: {}", config.database_path, e))?;
    std::fs::create_dir_all(&config.media_dir)?;

    let host = config.host.clone();
    let port = config.port;
    let media_url = config.media_url.trim_end_matches('/').to_string();
    let media_dir = config.media_dir.clone();
    let state = web::Data::new(AppState::new(store, config));

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(state.clone())
            .configure(services::configure)
            .service(Files::new(&media_url, &media_dir))
            .default_service(web::route().to(serve_embedded))
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;
    Ok(())
}
