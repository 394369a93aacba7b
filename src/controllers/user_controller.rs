use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use serde_json::json;

use crate::{models::CurrentUser, render, services::user_service, AppState};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn unauthorized_snippet() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Html(r#"<div class="text-danger">Unauthorized</div>"#.to_string()),
    )
        .into_response()
}

fn settings_ctx(user: &CurrentUser) -> serde_json::Value {
    json!({
        "email": user.email,
        "username": user.username,
    })
}

// GET /settings
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let body = state
        .hbs
        .render("pages/settings", &settings_ctx(&u))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    match render::render_full(&state, "Settings", body, Some(&u)) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct UsernameForm {
    pub username: String,
}

// POST /settings/username
pub async fn post_change_username(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<UsernameForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let username = form.username.trim().to_string();
    if username.len() < 2 {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Username must be at least 2 characters.</div>"#.to_string()),
        )
            .into_response();
    }

    if let Err(errs) = user_service::change_username(&state, &u.email, &username) {
        let msg = errs.values().next().cloned().unwrap_or_default();
        return (
            StatusCode::OK,
            Html(format!(r#"<div class="text-danger">{msg}</div>"#)),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Html(r#"<div class="text-success">Username updated.</div>"#.to_string()),
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct PasswordForm {
    #[serde(rename = "currentPassword")]
    pub current_password: String,

    #[serde(rename = "newPassword")]
    pub new_password: String,
}

// POST /settings/password
pub async fn post_change_password(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let new_password = form.new_password.trim().to_string();
    if new_password.len() < 6 {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Password must be at least 6 characters.</div>"#.to_string()),
        )
            .into_response();
    }

    if let Err(errs) =
        user_service::change_password(&state, &u.email, &form.current_password, &new_password)
    {
        let msg = errs.values().next().cloned().unwrap_or_default();
        return (
            StatusCode::OK,
            Html(format!(r#"<div class="text-danger">{msg}</div>"#)),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Html(r#"<div class="text-success">Password updated.</div>"#.to_string()),
    )
        .into_response()
}
