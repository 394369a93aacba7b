use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::services::alert_store::normalize_id;
use crate::services::coingecko::PriceError;
use crate::AppState;

fn fmt_usd(x: Option<f64>) -> String {
    match x {
        Some(v) => format!("{v:.2}"),
        None => "—".to_string(),
    }
}

// GET /coins/:id/detail
//
// Unlike the alert flow, a lookup failure here is user-visible: the partial
// renders an error row instead of data.
pub async fn get_coin_detail(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let coin_id = normalize_id(&id);
    if coin_id.is_empty() {
        let html = state
            .hbs
            .render(
                "partials/coin_detail",
                &json!({ "error": "Please select a valid coin." }),
            )
            .unwrap_or_else(|e| format!("template error: {e}"));
        return (StatusCode::OK, Html(html)).into_response();
    }

    let detail = match state.coingecko.coin_detail(&coin_id).await {
        Ok(d) => d,
        Err(e) => {
            let msg = match e {
                PriceError::Status(status) if status.as_u16() == 404 => {
                    "Coin not found. Please select a valid coin.".to_string()
                }
                _ => "Failed to fetch data. Please check your internet connection or try again later."
                    .to_string(),
            };
            let html = state
                .hbs
                .render("partials/coin_detail", &json!({ "error": msg }))
                .unwrap_or_else(|e| format!("template error: {e}"));
            return (StatusCode::OK, Html(html)).into_response();
        }
    };

    let change = detail.market_data.price_change_percentage_24h.unwrap_or(0.0);
    let current_target = state.alerts.target(&coin_id);

    let ctx = json!({
        "id": detail.id,
        "name": detail.name,
        "symbol": detail.symbol.to_uppercase(),
        "price": fmt_usd(detail.market_data.current_price.usd),
        "market_cap": fmt_usd(detail.market_data.market_cap.usd),
        "volume": fmt_usd(detail.market_data.total_volume.usd),
        "high_24h": fmt_usd(detail.market_data.high_24h.usd),
        "low_24h": fmt_usd(detail.market_data.low_24h.usd),
        "change_24h": format!("{change:.2}"),
        "change_class": if change < 0.0 { "text-danger" } else { "text-success" },
        "last_updated": detail.last_updated,
        "has_target": current_target.is_some(),
        "current_target": current_target.map(|t| format!("{t:.2}")),
        "error": serde_json::Value::Null,
    });

    let html = state
        .hbs
        .render("partials/coin_detail", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct ChartQuery {
    pub range: Option<String>,
}

fn range_config(range: &str) -> (u32, &'static str) {
    match range {
        "24h" => (1, "hourly"),
        "30d" => (30, "daily"),
        "1y" => (365, "daily"),
        // default view
        _ => (7, "hourly"),
    }
}

// GET /coins/:id/chart?range=7d, JSON series for the chart script.
pub async fn get_coin_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Response {
    let coin_id = normalize_id(&id);
    if coin_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid coin id" })),
        )
            .into_response();
    }

    let range = query.range.unwrap_or_else(|| "7d".to_string());
    let (days, interval) = range_config(&range);

    match state.coingecko.market_chart(&coin_id, days, interval).await {
        Ok(chart) => (
            StatusCode::OK,
            Json(json!({ "id": coin_id, "range": range, "prices": chart.prices })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("chart query for {coin_id} failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "chart data unavailable" })),
            )
                .into_response()
        }
    }
}
