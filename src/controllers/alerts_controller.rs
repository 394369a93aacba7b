use axum::{
    extract::{Extension, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{models::CurrentUser, render, services::alert_store::normalize_id, AppState};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn fmt2(x: f64) -> String {
    format!("{x:.2}")
}

fn alerts_list_ctx(state: &AppState) -> serde_json::Value {
    let mut items: Vec<serde_json::Value> = state
        .alerts
        .snapshot()
        .into_iter()
        .map(|(id, target)| json!({ "id": id, "target": fmt2(target) }))
        .collect();
    items.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));

    json!({ "alerts": items, "has_alerts": !items.is_empty() })
}

// ---------------- Pages ----------------

pub async fn get_alerts_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let body = state
        .hbs
        .render("pages/alerts", &alerts_list_ctx(&state))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, "Price Alerts", body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// ---------------- Partials ----------------

// GET /alerts/list
pub async fn get_alerts_list(State(state): State<AppState>) -> Response {
    let html = state
        .hbs
        .render("partials/alerts_list", &alerts_list_ctx(&state))
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

// GET /alerts/:id/target: "current target" text for the lookup table.
pub async fn get_alert_target(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let ctx = match state.alerts.target(&id) {
        Some(target) => json!({ "id": normalize_id(&id), "target": fmt2(target) }),
        None => json!({ "id": normalize_id(&id), "target": serde_json::Value::Null }),
    };

    let html = state
        .hbs
        .render("partials/alert_target", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct CreateAlertForm {
    #[serde(rename = "targetPrice")]
    pub target_price: String,
}

// POST /alerts/:id: register or update the alert for a coin.
pub async fn post_set_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<CreateAlertForm>,
) -> Response {
    let coin_id = normalize_id(&id);

    let target_str = form.target_price.trim();
    let target: f64 = match target_str.parse() {
        Ok(v) => v,
        Err(_) => {
            return (
                StatusCode::OK,
                Html(r#"<div class="text-danger">Please enter a valid target price.</div>"#.to_string()),
            )
                .into_response();
        }
    };

    if let Err(e) = state.alerts.set(&coin_id, target) {
        tracing::debug!("rejected alert for {coin_id:?}: {e}");
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Please enter a valid target price.</div>"#.to_string()),
        )
            .into_response();
    }

    // The monitor picks the new entry up on its next tick; ask the browser
    // for notification permission opportunistically, once.
    let html = format!(
        r#"<div class="text-success" data-request-notify>Current target: ${}</div>"#,
        fmt2(target)
    );
    (StatusCode::OK, Html(html)).into_response()
}

// POST /alerts/:id/delete
pub async fn post_delete_alert(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    if !state.alerts.remove(&id) {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-muted">No alert set for this coin.</div>"#.to_string()),
        )
            .into_response();
    }

    let html = state
        .hbs
        .render("partials/alerts_list", &alerts_list_ctx(&state))
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}
