use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use cointracker::services::{
    alert_monitor::AlertMonitor,
    alert_store::AlertStore,
    coingecko::CoinGeckoClient,
    notify::{NotificationSink, SseNotifier},
    portfolio_store::PortfolioStore,
    user_store::UserStore,
};
use cointracker::storage::KvStore;
use cointracker::{config, controllers::auth_controller, templates, AppState};
use tower::ServiceExt;

fn temp_data_dir() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir()
        .join(format!("cointracker-auth-web-{}-{n}", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

fn test_state() -> AppState {
    let mut settings = config::load();
    settings.data_dir = temp_data_dir();
    settings.coingecko_base_url = "http://127.0.0.1:9".to_string();

    let kv = KvStore::open(&settings.data_dir);
    let alerts = AlertStore::open(kv.clone());
    let portfolio = PortfolioStore::open(kv.clone());
    let users = UserStore::open(kv);

    let coingecko = CoinGeckoClient::new(settings.coingecko_base_url.clone());

    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(16);
    let notifier: Arc<dyn NotificationSink> = Arc::new(SseNotifier::new(events_tx.clone()));

    let monitor = AlertMonitor::new(
        alerts.clone(),
        Arc::new(coingecko.clone()),
        notifier.clone(),
        Duration::from_secs(3600),
    );

    AppState {
        hbs: templates::build_handlebars(),
        settings,
        coingecko,
        alerts,
        portfolio,
        users,
        notifier,
        monitor,
        events_tx,
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn post_login_missing_fields_renders_errors() {
    let state = test_state();
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=&password="))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Email is required."));
    assert!(body.contains("Password is required."));
}

#[tokio::test]
async fn post_login_invalid_email_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=not-an-email&password=123456"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email."));
}

#[tokio::test]
async fn post_login_unknown_user_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "email=nobody%40example.com&password=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email or password."));
}

#[tokio::test]
async fn post_register_password_mismatch_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=654321",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Passwords do not match."));
}

#[tokio::test]
async fn post_register_short_username_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=a&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("at least 2 characters"));
}

#[tokio::test]
async fn post_register_short_password_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123&rePassword=123",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("at least 6 characters"));
}

#[tokio::test]
async fn post_register_missing_repeat_password_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Repeat password is required."));
}

#[tokio::test]
async fn post_register_success_sets_cookie_and_redirects() {
    let state = test_state();
    let cookie_name = state.settings.jwt_cookie_name.clone();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get("Location").unwrap(), "/");

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(set_cookie.starts_with(&format!("{cookie_name}=")));

    assert!(state.users.find_by_email("test@example.com").is_some());
}

#[tokio::test]
async fn post_register_duplicate_email_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .with_state(state);

    let form = "username=TestUser&email=test%40example.com&password=123456&rePassword=123456";

    let first = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(form))
        .unwrap();
    let res = app.clone().oneshot(first).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let second = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(form))
        .unwrap();
    let res = app.oneshot(second).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Email has already been taken!"));
}

#[tokio::test]
async fn post_login_success_after_register_sets_cookie() {
    let state = test_state();
    let cookie_name = state.settings.jwt_cookie_name.clone();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let register = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();
    let res = app.clone().oneshot(register).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "email=test%40example.com&password=123456",
        ))
        .unwrap();
    let res = app.oneshot(login).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(set_cookie.starts_with(&format!("{cookie_name}=")));
}

#[tokio::test]
async fn post_login_wrong_password_renders_error() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let register = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();
    let res = app.clone().oneshot(register).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "email=test%40example.com&password=wrong-pass",
        ))
        .unwrap();
    let res = app.oneshot(login).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid email or password."));
}

#[tokio::test]
async fn post_login_htmx_success_uses_hx_redirect() {
    let state = test_state();
    let app = Router::new()
        .route("/register", post(auth_controller::post_register))
        .route("/login", post(auth_controller::post_login))
        .with_state(state);

    let register = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from(
            "username=TestUser&email=test%40example.com&password=123456&rePassword=123456",
        ))
        .unwrap();
    let res = app.clone().oneshot(register).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let login = Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(axum::body::Body::from(
            "email=test%40example.com&password=123456",
        ))
        .unwrap();
    let res = app.oneshot(login).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("HX-Redirect").unwrap(), "/");
}
