use axum::{
    extract::{Extension, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::CurrentUser, render, services::portfolio_service, AppState,
};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

async fn positions_ctx(state: &AppState) -> serde_json::Value {
    let (rows, grand_total) = portfolio_service::holding_views(state).await;

    let items: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "price": format!("{:.2}", r.price),
                "quantity": r.quantity,
                "total": format!("{:.2}", r.total),
                "live": r.live,
                "target": state.alerts.target(&r.id).map(|t| format!("{t:.2}")),
            })
        })
        .collect();

    json!({
        "positions": items,
        "has_positions": !items.is_empty(),
        "grand_total": format!("{grand_total:.2}"),
    })
}

// ---------------- Pages ----------------

pub async fn get_portfolio_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let positions = positions_ctx(&state).await;
    let body = state
        .hbs
        .render("pages/portfolio", &positions)
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, "Portfolio", body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// ---------------- Partials ----------------

// GET /portfolio/positions
pub async fn get_positions(State(state): State<AppState>) -> Response {
    let ctx = positions_ctx(&state).await;

    let html = state
        .hbs
        .render("partials/portfolio_positions", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct AddHoldingForm {
    #[serde(rename = "coinId")]
    pub coin_id: String,
    pub quantity: String,
}

// POST /portfolio: add a holding (accumulates quantity for an existing id).
pub async fn post_add_holding(
    State(state): State<AppState>,
    Form(form): Form<AddHoldingForm>,
) -> Response {
    let quantity: f64 = match form.quantity.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            return (
                StatusCode::OK,
                Html(r#"<div class="text-danger">Enter a valid quantity.</div>"#.to_string()),
            )
                .into_response();
        }
    };

    if let Err(e) = state.portfolio.add(&form.coin_id, quantity) {
        tracing::debug!("rejected holding {:?}: {e}", form.coin_id);
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger">Enter a valid coin id and quantity.</div>"#.to_string()),
        )
            .into_response();
    }

    get_positions(State(state)).await
}

// POST /portfolio/:id/delete
pub async fn post_delete_holding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    state.portfolio.remove(&id);
    get_positions(State(state)).await
}
