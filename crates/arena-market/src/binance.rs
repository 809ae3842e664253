use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::MarketError;
use crate::source::{ensure_success, http_client, parse_price, ping, PriceSource};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const EXCHANGE: &str = "Binance";

/// Body of `GET /api/v3/ticker/price?symbol=...`.
#[derive(Debug, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: String,
}

/// Extract the last price from a ticker body.
pub fn parse_ticker(symbol: &str, body: &str) -> Result<f64, MarketError> {
    let ticker: TickerPrice = serde_json::from_str(body)?;
    if !ticker.symbol.eq_ignore_ascii_case(symbol) {
        return Err(MarketError::SymbolNotFound(symbol.to_string()));
    }
    parse_price(symbol, &ticker.price)
}

/// Binance spot public ticker. Needs no credentials.
pub struct BinanceSource {
    client: Client,
    base_url: String,
}

impl BinanceSource {
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self, MarketError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        debug!(%symbol, %url, "Fetching Binance ticker");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        let body = ensure_success(EXCHANGE, response).await?.text().await?;
        parse_ticker(symbol, &body)
    }

    async fn is_available(&self) -> bool {
        ping(&self.client, &format!("{}/api/v3/ping", self.base_url)).await
    }
}
