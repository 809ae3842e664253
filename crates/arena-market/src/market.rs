use arena_models::config::MarketConfig;
use arena_models::snapshot::{PriceSnapshot, Symbol};
use tracing::{debug, info, warn};

use crate::error::MarketError;
use crate::source::{create_source, PriceSource};

/// The configured symbol list and the source that prices it.
///
/// A symbol whose price cannot be fetched is recorded as `0.0`, which
/// downstream code reads as "unavailable".
pub struct MarketData {
    source: Box<dyn PriceSource>,
    symbols: Vec<Symbol>,
}

impl MarketData {
    pub fn new(source: Box<dyn PriceSource>, symbols: Vec<Symbol>) -> Self {
        Self { source, symbols }
    }

    pub fn from_config(config: &MarketConfig) -> Result<Self, MarketError> {
        Ok(Self::new(create_source(config)?, config.symbols.clone()))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Price every configured symbol, in order.
    pub async fn current_prices(&self) -> PriceSnapshot {
        let mut prices = Vec::with_capacity(self.symbols.len());
        for symbol in &self.symbols {
            prices.push((symbol.clone(), self.price(symbol).await));
        }

        let snapshot = PriceSnapshot::new(prices);
        info!(
            source = %self.source.name(),
            symbols = snapshot.len(),
            available = snapshot.available().count(),
            "Collected prices"
        );
        snapshot
    }

    /// Single lookup; `0.0` when the source fails.
    pub async fn price(&self, symbol: &str) -> f64 {
        match self.source.fetch_price(symbol).await {
            Ok(price) => {
                debug!(%symbol, price, "Fetched price");
                price
            }
            Err(e) => {
                warn!(source = %self.source.name(), %symbol, error = %e, "Price fetch failed");
                0.0
            }
        }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.clone()
    }

    pub async fn is_available(&self) -> bool {
        self.source.is_available().await
    }
}
