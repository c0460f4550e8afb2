use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use backend::config::AppConfig;
use backend::services;
use backend::state::{AppState, ADMIN_PASSWORD_HEADER};
use backend::store::Store;
use common::model::bulletin::Bulletin;
use common::model::catalog::ProductCard;
use common::model::dictionary::{DictionaryEntry, DictionaryKind, EnrichedUnit};
use common::model::import::ImportReport;
use common::requests::{AuthCheckResponse, DictionaryImportResponse, ImageUploadResponse};
use serde_json::{json, Value};
use std::path::Path;

const PASSWORD: &str = "s3cret";
const BOUNDARY: &str = "showroom-test-boundary";
const VIN: &str = "WBA11AA0X0N000001";

const EXPORT: &str = "\
VIN,Model Code,Color Code,Upholstery Code,Order Status,Processing Type,List Price,Options
WBA11AA0X0N000001,21EM,475,LCSW,195,RET,52900,337 420
WBA11AA0X0N000002,21EM,475,LCSW,170,RET,51900,420 337
WBA11AA0X0N000003,31AB,300,LCSW,195,INT,41900,
";

fn state(media_dir: &Path) -> web::Data<AppState> {
    let config = AppConfig {
        admin_password: PASSWORD.to_string(),
        media_dir: media_dir.to_string_lossy().into_owned(),
        ..AppConfig::default()
    };
    web::Data::new(AppState::new(Store::open_in_memory().unwrap(), config))
}

/// Builds a `multipart/form-data` body. Parts with a filename are sent as
/// files.
fn multipart(parts: &[(&str, Option<&str>, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(file) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n",
                    name, file
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

fn import_request() -> test::TestRequest {
    let meta = json!({ "source": "main", "format": "standard" }).to_string();
    let (content_type, body) = multipart(&[
        ("json", None, meta.as_bytes()),
        ("file", Some("stock.csv"), EXPORT.as_bytes()),
    ]);
    test::TestRequest::post()
        .uri("/api/admin/import")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state).configure(services::configure)).await
    };
}

#[actix_web::test]
async fn test_auth_check() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));

    let req = test::TestRequest::post()
        .uri("/api/auth/check")
        .set_json(json!({ "password": PASSWORD }))
        .to_request();
    let resp: AuthCheckResponse = test::call_and_read_body_json(&app, req).await;
    assert!(resp.ok);

    let req = test::TestRequest::post()
        .uri("/api/auth/check")
        .set_json(json!({ "password": "guess" }))
        .to_request();
    let resp: AuthCheckResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!resp.ok);
}

#[actix_web::test]
async fn test_admin_routes_need_password() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));

    let req = test::TestRequest::get().uri("/api/admin/imports").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/admin/bulletins")
        .insert_header((ADMIN_PASSWORD_HEADER, "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn test_failed_media_delete_keeps_unit() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));
    test::call_service(&app, import_request().to_request()).await;
    // A plain file where the image directory should be cannot be listed.
    std::fs::write(media.path().join(VIN), b"not a directory").unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/units/{}", VIN))
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let req = test::TestRequest::get()
        .uri(&format!("/api/units/{}", VIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_import_then_browse_catalog() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));

    let report: ImportReport =
        test::call_and_read_body_json(&app, import_request().to_request()).await;
    assert_eq!(report.synced, 3);
    assert_eq!(report.groups, 2);
    assert_eq!(report.skipped.hidden_internal, 1);

    let req = test::TestRequest::get().uri("/api/catalog").to_request();
    let cards: Vec<ProductCard> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards.len(), 1, "internal stock stays out of the catalog");
    assert_eq!(cards[0].vins.len(), 2);
    assert_eq!(cards[0].representative.vin, VIN);
    assert_eq!(cards[0].price, Some(51_900.0));

    let req = test::TestRequest::get()
        .uri("/api/catalog?sort=price_desc&model=31ab")
        .to_request();
    let cards: Vec<ProductCard> = test::call_and_read_body_json(&app, req).await;
    assert!(cards.is_empty());

    let req = test::TestRequest::get().uri("/api/catalog?model=21e").to_request();
    let cards: Vec<ProductCard> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards.len(), 1, "model filter matches by prefix");

    let req = test::TestRequest::get()
        .uri("/api/units/WBA11AA0X0N000003")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/admin/imports")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let log: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["outcome"], "ok");
}

#[actix_web::test]
async fn test_rejected_import_answers_bad_request() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));

    let meta = json!({ "source": "main" }).to_string();
    let (content_type, body) = multipart(&[
        ("json", None, meta.as_bytes()),
        ("file", Some("stock.csv"), &b"Title only\nno columns here\n"[..]),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/admin/import")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_dictionary_enriches_unit_detail() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));
    test::call_service(&app, import_request().to_request()).await;

    let entry = DictionaryEntry {
        kind: DictionaryKind::Model,
        code: "21em".to_string(),
        name: "i4 eDrive40".to_string(),
        attributes: json!({ "body_group": "G26" }),
    };
    let req = test::TestRequest::put()
        .uri("/api/admin/dictionary")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .set_json(&entry)
        .to_request();
    let saved: DictionaryEntry = test::call_and_read_body_json(&app, req).await;
    assert_eq!(saved.code, "21EM");

    let (content_type, body) = multipart(&[(
        "file",
        Some("dictionary.csv"),
        &b"Type,Code,Name\ncolor,475,Black Sapphire\nwheel,W1,Rim\n"[..],
    )]);
    let req = test::TestRequest::post()
        .uri("/api/admin/dictionary/import")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let imported: DictionaryImportResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(imported.imported, 1);
    assert_eq!(imported.skipped, 1);

    let req = test::TestRequest::put()
        .uri("/api/admin/service-prices")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .set_json(json!({ "package": "bsi", "series_code": "g26", "price": 1290.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/units/{}", VIN))
        .to_request();
    let unit: EnrichedUnit = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unit.model_name, "i4 eDrive40");
    assert_eq!(unit.color_name, "Black Sapphire");
    assert_eq!(unit.upholstery_name, "LCSW");
    assert_eq!(unit.service_offers.len(), 1);
    assert_eq!(unit.service_offers[0].package, "BSI");

    let req = test::TestRequest::get()
        .uri("/api/admin/dictionary?kind=colour")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let colors: Vec<DictionaryEntry> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(colors.len(), 1);

    let req = test::TestRequest::delete()
        .uri("/api/admin/dictionary/option/999")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_image_upload_and_purge() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));
    test::call_service(&app, import_request().to_request()).await;

    let png: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    let (content_type, body) = multipart(&[
        ("key", None, VIN.as_bytes()),
        ("file", Some("front.png"), png),
    ]);
    let req = test::TestRequest::post()
        .uri("/api/admin/images/upload")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .insert_header(("content-type", content_type))
        .set_payload(body)
        .to_request();
    let uploaded: ImageUploadResponse = test::call_and_read_body_json(&app, req).await;
    assert!(uploaded.url.starts_with(&format!("/media/{}/", VIN)));
    assert!(media.path().join(VIN).is_dir());

    let req = test::TestRequest::get().uri("/api/catalog").to_request();
    let cards: Vec<ProductCard> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards[0].photo.as_deref(), Some(uploaded.url.as_str()));

    let req = test::TestRequest::post()
        .uri("/api/admin/images/purge")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .set_json(json!({ "vin": VIN }))
        .to_request();
    let purged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(purged["removed"], 1);
    assert!(!media.path().join(VIN).exists());

    let req = test::TestRequest::get().uri("/api/units").to_request();
    let units: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert!(units.iter().all(|u| u["images"] == json!([])));
}

#[actix_web::test]
async fn test_bulletins_show_on_matching_cards() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));
    test::call_service(&app, import_request().to_request()).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/bulletins")
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .set_json(json!({ "title": "i4 weeks", "model_prefix": "21", "discount_percent": 3.0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Bulletin = test::read_body_json(resp).await;
    assert!(created.id > 0);

    let req = test::TestRequest::get().uri("/api/catalog").to_request();
    let cards: Vec<ProductCard> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards[0].bulletins.len(), 1);
    assert_eq!(cards[0].bulletins[0].title, "i4 weeks");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/bulletins/{}", created.id))
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_unit_curation_and_purge() {
    let media = tempfile::tempdir().unwrap();
    let app = init_app!(state(media.path()));
    test::call_service(&app, import_request().to_request()).await;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/admin/units/{}", VIN))
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .set_json(json!({ "special_price": 49900.0 }))
        .to_request();
    let unit: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unit["special_price"], 49900.0);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/units/{}", VIN))
        .insert_header((ADMIN_PASSWORD_HEADER, PASSWORD))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/units/{}", VIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
