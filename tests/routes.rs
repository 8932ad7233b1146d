use actix_web::cookie::Key;
use actix_web::{App, http::StatusCode, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use serde_json::{Value, json};
use tera::Tera;

use dental_dashboard::configure;
use dental_dashboard::forms::guard::SubmitGuard;
use dental_dashboard::models::auth::{USER_BRANCH_HEADER, USER_ROLE_HEADER};
use dental_dashboard::models::config::{CollectionIds, ServerConfig};
use dental_dashboard::repository::DieselRepository;

mod common;

use common::{TestDb, insert, patient};

const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

fn server_config(test_db: &TestDb) -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port: 8080,
        database_url: test_db.path().to_string_lossy().into_owned(),
        database_id: "test".into(),
        templates_dir: "templates/**/*".into(),
        secret: SECRET.into(),
        collections: CollectionIds::default(),
    }
}

macro_rules! app {
    ($test_db:expr) => {{
        let config = server_config(&$test_db);
        let tera = Tera::new(&config.templates_dir).expect("templates");
        let store = CookieMessageStore::builder(Key::from(SECRET.as_bytes())).build();
        test::init_service(
            App::new()
                .wrap(FlashMessagesFramework::builder(store).build())
                .app_data(web::Data::new(tera))
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .app_data(web::Data::new(SubmitGuard::new()))
                .app_data(web::Data::new(config))
                .configure(configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_api_list_returns_data_and_total() {
    let test_db = TestDb::new("test_api_list_returns_data_and_total.db");
    let repo = test_db.repo();
    for i in 1..=4 {
        let mut value = patient(&format!("BN{i:04}"), &format!("Patient {i}"));
        value["branch"] = json!(if i % 2 == 0 { "q1" } else { "q3" });
        insert(&repo, "patients", value);
    }
    let app = app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/patients?limit=1")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri("/api/v1/patients")
        .insert_header((USER_ROLE_HEADER, "receptionist"))
        .insert_header((USER_BRANCH_HEADER, "q1"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);
    assert!(
        body["data"]
            .as_array()
            .into_iter()
            .flatten()
            .all(|p| p["branch"] == "q1")
    );
}

#[actix_web::test]
async fn test_api_rejects_missing_user_context_and_unknown_entity() {
    let test_db = TestDb::new("test_api_rejects_missing_user_context.db");
    let app = app!(test_db);

    let req = test::TestRequest::get().uri("/api/v1/patients").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/invoices")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_patient_list_page_renders() {
    let test_db = TestDb::new("test_patient_list_page_renders.db");
    let repo = test_db.repo();
    insert(&repo, "patients", patient("BN0001", "Tran Van An"));
    insert(&repo, "patients", patient("BN0002", "Nguyen Thi Binh"));
    let app = app!(test_db);

    let req = test::TestRequest::get()
        .uri("/patients?search=tran")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);
    assert!(html.contains("Tran Van An"));
    assert!(!html.contains("Nguyen Thi Binh"));
    assert!(html.contains("1-1 of 1"));
}

#[actix_web::test]
async fn test_empty_list_page_shows_no_results() {
    let test_db = TestDb::new("test_empty_list_page_shows_no_results.db");
    let app = app!(test_db);

    let req = test::TestRequest::get()
        .uri("/services?status=inactive")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("No results"));
}

/// Body of a page fetched as super admin.
macro_rules! page_html {
    ($app:expr, $uri:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .insert_header((USER_ROLE_HEADER, "super_admin"))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        String::from_utf8_lossy(&test::read_body(resp).await).into_owned()
    }};
}

#[actix_web::test]
async fn test_page_past_the_end_shows_the_last_page() {
    let test_db = TestDb::new("test_page_past_the_end_shows_the_last_page.db");
    let repo = test_db.repo();
    for i in 1..=45 {
        insert(
            &repo,
            "patients",
            patient(&format!("BN{i:04}"), &format!("Person {i:02}")),
        );
    }
    let app = app!(test_db);

    let html = page_html!(app, "/patients?page=4");
    assert!(html.contains("41-45 of 45"));
    assert!(html.contains("Person 01"));
    assert!(html.contains("Person 05"));
    assert!(!html.contains("Person 06"));
    assert!(!html.contains("No results"));
}

#[actix_web::test]
async fn test_filter_controls_start_from_the_first_page() {
    let test_db = TestDb::new("test_filter_controls_start_from_the_first_page.db");
    let repo = test_db.repo();
    for i in 1..=60 {
        insert(
            &repo,
            "patients",
            patient(&format!("BN{i:04}"), &format!("Person {i:02}")),
        );
    }
    for (code, category) in [("VT01", "Consumables"), ("VT02", "Anesthetics")] {
        insert(
            &repo,
            "inventory",
            json!({"code": code, "name": code, "category": category, "quantity": 3}),
        );
    }
    let app = app!(test_db);

    let html = page_html!(app, "/patients?page=3&status=all");
    assert!(html.contains("41-60 of 60"));
    assert!(!html.contains("name=\"page\""));
    let tabs = html
        .match_indices("<a class=\"tab")
        .map(|(start, _)| &html[start..start + html[start..].find('>').unwrap_or(0)])
        .collect::<Vec<_>>();
    assert!(!tabs.is_empty());
    assert!(tabs.iter().all(|tab| !tab.contains("page=")));

    let html = page_html!(app, "/inventory?page=2&filter=Consumables");
    assert!(html.contains("<select name=\"filter\""));
    assert!(!html.contains("name=\"page\""));
}

#[actix_web::test]
async fn test_form_errors_keep_pending_flash_alerts() {
    let test_db = TestDb::new("test_form_errors_keep_pending_flash_alerts.db");
    let app = app!(test_db);

    let req = test::TestRequest::post()
        .uri("/patients/missing/delete")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let cookies = resp
        .response()
        .cookies()
        .map(|cookie| cookie.into_owned())
        .collect::<Vec<_>>();
    assert!(!cookies.is_empty());

    let mut req = test::TestRequest::post()
        .uri("/patients/add")
        .insert_header((USER_ROLE_HEADER, "super_admin"))
        .set_form([("name", "")]);
    for cookie in cookies {
        req = req.cookie(cookie);
    }
    let resp = test::call_service(&app, req.to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8_lossy(&test::read_body(resp).await).into_owned();
    assert!(html.contains("Patient not found."));
    assert!(html.contains("Please check the form"));
}
