use std::collections::BTreeMap;

use arena_models::snapshot::Symbol;
use async_trait::async_trait;

use crate::error::MarketError;
use crate::source::PriceSource;

/// Serves prices from configuration. Used for offline dry runs.
pub struct FixedPriceSource {
    prices: BTreeMap<Symbol, f64>,
}

impl FixedPriceSource {
    pub fn new(prices: BTreeMap<Symbol, f64>) -> Self {
        Self { prices }
    }
}

#[async_trait]
impl PriceSource for FixedPriceSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, MarketError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))
    }

    async fn is_available(&self) -> bool {
        true
    }
}
