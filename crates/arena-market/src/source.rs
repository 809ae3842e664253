use std::time::Duration;

use arena_models::config::{ExchangeKind, MarketConfig};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::warn;

use crate::binance::BinanceSource;
use crate::bitget::BitgetSource;
use crate::error::MarketError;
use crate::fixed::FixedPriceSource;

/// Where last-traded prices come from.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketError>;

    /// Whether the source is reachable at all.
    async fn is_available(&self) -> bool;
}

/// Create the price source the market section is configured for.
pub fn create_source(config: &MarketConfig) -> Result<Box<dyn PriceSource>, MarketError> {
    let timeout = Duration::from_secs(config.request_timeout_seconds);
    match config.exchange {
        ExchangeKind::Binance => Ok(Box::new(BinanceSource::new(
            config.base_url.clone(),
            timeout,
        )?)),
        ExchangeKind::Bitget => Ok(Box::new(BitgetSource::new(
            config.base_url.clone(),
            timeout,
        )?)),
        ExchangeKind::Fixed => Ok(Box::new(FixedPriceSource::new(
            config.fixed_prices.clone(),
        ))),
    }
}

/// Parse an exchange's decimal price string. Non-finite and negative values
/// are rejected.
pub fn parse_price(symbol: &str, raw: &str) -> Result<f64, MarketError> {
    let invalid = || MarketError::InvalidPrice {
        symbol: symbol.to_string(),
        raw: raw.to_string(),
    };
    let price: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !price.is_finite() || price < 0.0 {
        return Err(invalid());
    }
    Ok(price)
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, MarketError> {
    Ok(Client::builder()
        .user_agent(concat!("alpha-arena/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

pub(crate) async fn ensure_success(
    exchange: &str,
    response: Response,
) -> Result<Response, MarketError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(exchange, status = status.as_u16(), "Exchange request failed");
    Err(MarketError::Api {
        exchange: exchange.to_string(),
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn ping(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn creates_each_exchange() {
        for (exchange, name) in [
            (ExchangeKind::Binance, "binance"),
            (ExchangeKind::Bitget, "bitget"),
            (ExchangeKind::Fixed, "fixed"),
        ] {
            let config = MarketConfig {
                exchange,
                ..MarketConfig::default()
            };
            assert_eq!(create_source(&config).unwrap().name(), name);
        }
    }

    #[tokio::test]
    async fn fixed_source_uses_configured_prices() {
        let config = MarketConfig {
            exchange: ExchangeKind::Fixed,
            fixed_prices: BTreeMap::from([("BTCUSDT".to_string(), 64000.0)]),
            ..MarketConfig::default()
        };
        let source = create_source(&config).unwrap();
        assert_eq!(source.fetch_price("BTCUSDT").await.unwrap(), 64000.0);
    }

    #[test]
    fn parse_price_accepts_exchange_decimals() {
        assert_eq!(parse_price("BTCUSDT", "64000.01000000").unwrap(), 64000.01);
        assert_eq!(parse_price("XRPUSDT", " 0.5234 ").unwrap(), 0.5234);
        assert_eq!(parse_price("DEAD", "0").unwrap(), 0.0);
    }

    #[test]
    fn parse_price_rejects_garbage() {
        for raw in ["", "abc", "-1.5", "NaN", "inf"] {
            match parse_price("BTCUSDT", raw) {
                Err(MarketError::InvalidPrice { symbol, raw: got }) => {
                    assert_eq!(symbol, "BTCUSDT");
                    assert_eq!(got, raw);
                }
                other => panic!("expected InvalidPrice for {raw:?}, got {other:?}"),
            }
        }
    }
}
