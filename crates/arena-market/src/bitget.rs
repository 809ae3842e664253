use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::MarketError;
use crate::source::{ensure_success, http_client, parse_price, ping, PriceSource};

pub const DEFAULT_BASE_URL: &str = "https://api.bitget.com";
const EXCHANGE: &str = "Bitget";
const SUCCESS_CODE: &str = "00000";

/// Envelope shared by Bitget v2 REST responses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotTicker {
    pub symbol: String,
    pub last_pr: String,
}

/// Extract the last price from a `/api/v2/spot/market/tickers` body.
///
/// A non-success `code` is reported as `MarketError::Api` even when the HTTP
/// status was 200.
pub fn parse_tickers(symbol: &str, body: &str) -> Result<f64, MarketError> {
    let envelope: Envelope<Vec<SpotTicker>> = serde_json::from_str(body)?;
    if envelope.code != SUCCESS_CODE {
        return Err(MarketError::Api {
            exchange: EXCHANGE.to_string(),
            status: 200,
            body: format!("{}: {}", envelope.code, envelope.msg),
        });
    }

    let ticker = envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))?;
    parse_price(symbol, &ticker.last_pr)
}

/// Bitget spot public ticker. Needs no credentials.
pub struct BitgetSource {
    client: Client,
    base_url: String,
}

impl BitgetSource {
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
impl PriceSource for BitgetSource {
    fn name(&self) -> &str {
        "bitget"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketError> {
        let url = format!("{}/api/v2/spot/market/tickers", self.base_url);
        debug!(%symbol, %url, "Fetching Bitget ticker");

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?;
        let body = ensure_success(EXCHANGE, response).await?.text().await?;
        parse_tickers(symbol, &body)
    }

    async fn is_available(&self) -> bool {
        ping(&self.client, &format!("{}/api/v2/public/time", self.base_url)).await
    }
}
