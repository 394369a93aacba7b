use std::collections::HashMap;

use crate::services::coingecko::PriceSource;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct HoldingView {
    pub id: String,
    pub price: f64,
    pub quantity: f64,
    pub total: f64,
    pub live: bool,
}

/// Temporary UI fallback while the price API is unavailable. Display-only:
/// the alert monitor never sees these numbers.
fn mock_price(id: &str) -> Option<f64> {
    match id {
        "bitcoin" => Some(68000.0),
        "ethereum" => Some(3600.0),
        "solana" => Some(160.0),
        "binancecoin" => Some(590.0),
        "cardano" => Some(0.45),
        _ => None,
    }
}

/// Build the valuation rows for every holding, plus the grand total.
///
/// Prices come from one batched query; when the query fails or an id is
/// missing from the response, the row falls back to the mock price (or zero)
/// so the table still renders.
pub async fn holding_views(state: &AppState) -> (Vec<HoldingView>, f64) {
    let holdings = state.portfolio.snapshot();
    if holdings.is_empty() {
        return (Vec::new(), 0.0);
    }

    let ids: Vec<String> = holdings.keys().cloned().collect();
    let live_prices: HashMap<String, f64> = match state.coingecko.simple_prices(&ids).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("portfolio price query failed, using fallback prices: {e}");
            HashMap::new()
        }
    };

    let mut rows: Vec<HoldingView> = Vec::with_capacity(holdings.len());
    let mut grand_total = 0.0;

    for (id, quantity) in holdings {
        let (price, live) = match live_prices.get(&id) {
            Some(p) => (*p, true),
            None => (mock_price(&id).unwrap_or(0.0), false),
        };

        let total = price * quantity;
        grand_total += total;

        rows.push(HoldingView {
            id,
            price,
            quantity,
            total,
            live,
        });
    }

    rows.sort_by(|a, b| a.id.cmp(&b.id));
    (rows, grand_total)
}
