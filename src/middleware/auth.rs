use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{models::CurrentUser, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    // user email
    pub sub: String,
    // expiry (unix timestamp seconds)
    pub exp: usize,
}

fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;

    for part in raw.split(';') {
        let part = part.trim();
        let mut it = part.splitn(2, '=');
        let k = it.next()?.trim();
        let v = it.next()?.trim();
        if k == name {
            return Some(v.to_string());
        }
    }
    None
}

pub async fn inject_current_user(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.jwt_cookie_name.as_str();

    if let Some(token) = get_cookie(req.headers(), cookie_name) {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
            &validation,
        );

        if let Ok(data) = decoded {
            if let Some(user) = state.users.find_by_email(&data.claims.sub) {
                // Store user in request extensions so handlers can access it
                req.extensions_mut().insert(CurrentUser::from(user));
            }
        }
    }

    next.run(req).await
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

// The dashboard, alerts and portfolio work logged-out (the stores are
// process-wide); only the account pages need a session.
fn needs_auth(path: &str) -> bool {
    path == "/settings" || path.starts_with("/settings/")
}

pub async fn require_auth(
    State(_state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();

    if !needs_auth(path) {
        return next.run(req).await;
    }

    // If inject_current_user already put CurrentUser in extensions => authenticated
    if req.extensions().get::<CurrentUser>().is_some() {
        return next.run(req).await;
    }

    // Not logged in:
    // - HTMX: force full redirect to /login
    // - Normal: 302 redirect to /login
    if is_htmx(req.headers()) {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Redirect", HeaderValue::from_static("/login"));
        return (StatusCode::OK, headers, Html("".to_string())).into_response();
    }

    Redirect::to("/login").into_response()
}
