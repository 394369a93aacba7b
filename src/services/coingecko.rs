use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current USD price per coin id, produced fresh by each poll and discarded
/// after comparison.
pub type PriceSnapshot = HashMap<String, f64>;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("price request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("price request returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Anything that can answer one batched spot-price query.
///
/// The batch contract matters: implementations must issue a single request
/// for the whole id set, and a failure is a single failure, never partial
/// results mixed with an error. Ids the source does not know are simply
/// absent from the snapshot.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn simple_prices(&self, ids: &[String]) -> Result<PriceSnapshot, PriceError>;
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full market data for one coin, as shown on the lookup table.
    pub async fn coin_detail(&self, id: &str) -> Result<CoinDetail, PriceError> {
        let url = format!("{}/coins/{id}", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "true"),
                ("community_data", "false"),
                ("developer_data", "false"),
                ("sparkline", "false"),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PriceError::Status(res.status()));
        }

        Ok(res.json::<CoinDetail>().await?)
    }

    /// Historical price series for the chart view.
    pub async fn market_chart(
        &self,
        id: &str,
        days: u32,
        interval: &str,
    ) -> Result<MarketChart, PriceError> {
        let url = format!("{}/coins/{id}/market_chart", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("days", &days.to_string()),
                ("interval", interval),
            ])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PriceError::Status(res.status()));
        }

        Ok(res.json::<MarketChart>().await?)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn simple_prices(&self, ids: &[String]) -> Result<PriceSnapshot, PriceError> {
        let url = format!("{}/simple/price", self.base_url);
        let res = self
            .http
            .get(&url)
            .query(&[("ids", ids.join(",").as_str()), ("vs_currencies", "usd")])
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PriceError::Status(res.status()));
        }

        let raw = res.json::<HashMap<String, SimplePriceEntry>>().await?;
        Ok(flatten_simple_prices(raw))
    }
}

#[derive(Debug, Deserialize)]
pub struct SimplePriceEntry {
    pub usd: Option<f64>,
}

fn flatten_simple_prices(raw: HashMap<String, SimplePriceEntry>) -> PriceSnapshot {
    raw.into_iter()
        .filter_map(|(id, entry)| entry.usd.map(|usd| (id, usd)))
        .collect()
}

// ----- /coins/{id} response (only the fields the UI shows) -----

#[derive(Debug, Deserialize, Serialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub market_data: MarketData,
    pub last_updated: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarketData {
    pub current_price: UsdQuote,
    pub market_cap: UsdQuote,
    pub total_volume: UsdQuote,
    pub high_24h: UsdQuote,
    pub low_24h: UsdQuote,
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UsdQuote {
    pub usd: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarketChart {
    // [timestamp_ms, price] pairs
    pub prices: Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{flatten_simple_prices, CoinDetail, MarketChart, SimplePriceEntry};

    #[test]
    fn flatten_drops_entries_without_usd() {
        let mut raw = HashMap::new();
        raw.insert("bitcoin".to_string(), SimplePriceEntry { usd: Some(51000.0) });
        raw.insert("obscurecoin".to_string(), SimplePriceEntry { usd: None });

        let snapshot = flatten_simple_prices(raw);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("bitcoin"), Some(&51000.0));
    }

    #[test]
    fn decodes_simple_price_payload() {
        let payload = r#"{"bitcoin":{"usd":51000.5},"ethereum":{"usd":3000}}"#;
        let raw: HashMap<String, SimplePriceEntry> =
            serde_json::from_str(payload).expect("decode");

        let snapshot = flatten_simple_prices(raw);
        assert_eq!(snapshot.get("bitcoin"), Some(&51000.5));
        assert_eq!(snapshot.get("ethereum"), Some(&3000.0));
    }

    #[test]
    fn decodes_coin_detail_payload() {
        let payload = r#"{
            "id": "bitcoin",
            "name": "Bitcoin",
            "symbol": "btc",
            "last_updated": "2024-05-01T12:00:00.000Z",
            "market_data": {
                "current_price": {"usd": 68000.0},
                "market_cap": {"usd": 1300000000000.0},
                "total_volume": {"usd": 25000000000.0},
                "high_24h": {"usd": 69000.0},
                "low_24h": {"usd": 67000.0},
                "price_change_percentage_24h": -1.25
            }
        }"#;

        let detail: CoinDetail = serde_json::from_str(payload).expect("decode");
        assert_eq!(detail.id, "bitcoin");
        assert_eq!(detail.market_data.current_price.usd, Some(68000.0));
        assert_eq!(detail.market_data.price_change_percentage_24h, Some(-1.25));
    }

    #[test]
    fn decodes_market_chart_payload() {
        let payload = r#"{"prices":[[1714560000000.0, 60000.0],[1714563600000.0, 60100.0]]}"#;
        let chart: MarketChart = serde_json::from_str(payload).expect("decode");
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.prices[0].1, 60000.0);
    }
}
