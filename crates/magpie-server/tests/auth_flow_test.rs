//! Login, logout and access control flows against the in-process app.
//!
//! Each test pins a distinct client address so the per-address login rate
//! limiter state never bleeds between tests.

mod common;

use actix_web::{
    App,
    http::{StatusCode, header},
    test, web,
};

use common::{TEST_PASSWORD, TEST_USERNAME, build_state};
use magpie_server::{api, middleware::auth::Authentication};

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(Authentication)
                .app_data(web::Data::from($state))
                .service(api::routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_is_public() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "UP");
}

#[actix_web::test]
async fn test_api_request_without_token_gets_401_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/start")
        .set_json(serde_json::json!({"urls": "http://images.test/a.jpg"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");
}

#[actix_web::test]
async fn test_page_request_without_token_redirects_to_login() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/login?next=%2F"
    );
}

#[actix_web::test]
async fn test_redirect_preserves_original_path() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::get().uri("/some/page").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/login?next=%2Fsome%2Fpage"
    );
}

#[actix_web::test]
async fn test_login_page_renders_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::get().uri("/login").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains(r#"<form method="post" action="/login">"#));
    assert!(!text.contains(r#"class="error""#));
}

#[actix_web::test]
async fn test_login_success_sets_cookie_and_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path());
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr("10.1.0.1:40000".parse().unwrap())
        .set_form([
            ("username", TEST_USERNAME),
            ("password", TEST_PASSWORD),
            ("next", "/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "magpie_token")
        .expect("login should set the session cookie")
        .into_owned();
    assert!(cookie.http_only().unwrap_or(false));

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_failure_rerenders_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr("10.1.0.2:40000".parse().unwrap())
        .set_form([("username", TEST_USERNAME), ("password", "wrong")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = std::str::from_utf8(&body).unwrap();
    assert!(text.contains("Invalid username or password"));
}

#[actix_web::test]
async fn test_login_json_flow_returns_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr("10.1.0.3:40000".parse().unwrap())
        .insert_header((header::ACCEPT, "application/json"))
        .set_form([("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let authorization = resp
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(authorization.starts_with("Bearer "));

    let body: serde_json::Value = test::read_body_json(resp).await;
    let token = body["accessToken"].as_str().unwrap().to_string();
    assert_eq!(body["username"], TEST_USERNAME);
    assert!(body["tokenTtl"].as_i64().unwrap() > 0);

    // An authenticated API call with the returned token passes the guard
    // and fails on validation instead of auth.
    let req = test::TestRequest::post()
        .uri("/start")
        .insert_header(("accessToken", token))
        .set_json(serde_json::json!({"urls": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_login_lockout_after_repeated_failures() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));
    let peer = "10.1.0.4:40000".parse().unwrap();

    for _ in 0..5 {
        let req = test::TestRequest::post()
            .uri("/login")
            .peer_addr(peer)
            .set_form([("username", TEST_USERNAME), ("password", "wrong")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // Even correct credentials are rejected while the address is locked.
    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr(peer)
        .insert_header((header::ACCEPT, "application/json"))
        .set_form([("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Too many login attempts")
    );
}

#[actix_web::test]
async fn test_logout_clears_cookie_and_redirects() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app!(build_state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/login")
        .peer_addr("10.1.0.5:40000".parse().unwrap())
        .set_form([("username", TEST_USERNAME), ("password", TEST_PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "magpie_token")
        .unwrap()
        .into_owned();

    let req = test::TestRequest::get()
        .uri("/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

    let removal = resp
        .response()
        .cookies()
        .find(|c| c.name() == "magpie_token")
        .expect("logout should reset the session cookie");
    assert_eq!(removal.value(), "");
}
