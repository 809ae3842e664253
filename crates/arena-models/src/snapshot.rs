use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque instrument identifier, e.g. `BTCUSDT`.
pub type Symbol = String;

/// Symbols tracked by the reference deployment, in prompt order.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["BTCUSDT", "ETHUSDT", "XRPUSDT", "BNBUSDT", "SOLUSDT"];

pub fn default_symbols() -> Vec<Symbol> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

/// A single quoted price inside a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolPrice {
    pub symbol: Symbol,
    /// `0.0` means the price was unavailable.
    pub price: f64,
}

/// Point-in-time prices for a set of symbols. Immutable once built.
///
/// A price of exactly `0.0`, or a symbol that is absent altogether, means
/// "unavailable". Negative and non-finite inputs are stored as `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceSnapshot {
    taken_at: DateTime<Utc>,
    prices: Vec<SymbolPrice>,
}

impl PriceSnapshot {
    /// Build a snapshot, keeping first-seen symbol order. A repeated symbol
    /// overwrites the earlier price.
    pub fn new<I, S>(prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Symbol>,
    {
        Self::at(Utc::now(), prices)
    }

    pub fn at<I, S>(taken_at: DateTime<Utc>, prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Symbol>,
    {
        let mut collected: Vec<SymbolPrice> = Vec::new();
        for (symbol, price) in prices {
            let symbol = symbol.into();
            let price = if price.is_finite() && price > 0.0 {
                price
            } else {
                0.0
            };
            match collected.iter_mut().find(|p| p.symbol == symbol) {
                Some(existing) => existing.price = price,
                None => collected.push(SymbolPrice { symbol, price }),
            }
        }
        Self {
            taken_at,
            prices: collected,
        }
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Price for `symbol`, or `0.0` when missing.
    pub fn price(&self, symbol: &str) -> f64 {
        self.prices
            .iter()
            .find(|p| p.symbol == symbol)
            .map(|p| p.price)
            .unwrap_or(0.0)
    }

    pub fn is_available(&self, symbol: &str) -> bool {
        self.price(symbol) > 0.0
    }

    /// All entries in insertion order, including unavailable ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.prices.iter().map(|p| (p.symbol.as_str(), p.price))
    }

    pub fn available(&self) -> impl Iterator<Item = (&str, f64)> {
        self.iter().filter(|(_, price)| *price > 0.0)
    }

    pub fn has_any_price(&self) -> bool {
        self.available().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_symbol_reads_as_zero() {
        let snapshot = PriceSnapshot::new([("BTCUSDT", 64000.5)]);
        assert_eq!(snapshot.price("BTCUSDT"), 64000.5);
        assert_eq!(snapshot.price("ETHUSDT"), 0.0);
        assert!(!snapshot.is_available("ETHUSDT"));
    }

    #[test]
    fn invalid_prices_become_unavailable() {
        let snapshot = PriceSnapshot::new([
            ("BTCUSDT", -1.0),
            ("ETHUSDT", f64::NAN),
            ("XRPUSDT", f64::INFINITY),
            ("SOLUSDT", 0.0),
        ]);
        assert_eq!(snapshot.len(), 4);
        assert!(!snapshot.has_any_price());
    }

    #[test]
    fn keeps_insertion_order_and_last_write() {
        let snapshot = PriceSnapshot::new([
            ("SOLUSDT", 150.0),
            ("BTCUSDT", 1.0),
            ("SOLUSDT", 151.0),
        ]);
        let symbols: Vec<&str> = snapshot.iter().map(|(s, _)| s).collect();
        assert_eq!(symbols, vec!["SOLUSDT", "BTCUSDT"]);
        assert_eq!(snapshot.price("SOLUSDT"), 151.0);
    }

    #[test]
    fn available_skips_sentinels() {
        let snapshot = PriceSnapshot::new([("BTCUSDT", 0.0), ("ETHUSDT", 3000.0)]);
        let available: Vec<(&str, f64)> = snapshot.available().collect();
        assert_eq!(available, vec![("ETHUSDT", 3000.0)]);
        assert!(snapshot.has_any_price());
    }

    #[test]
    fn roundtrip_snapshot() {
        let snapshot = PriceSnapshot::new([("BTCUSDT", 64000.0), ("ETHUSDT", 0.0)]);
        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: PriceSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, deserialized);
    }

    #[test]
    fn default_symbol_list() {
        let symbols = default_symbols();
        assert_eq!(symbols.len(), 5);
        assert_eq!(symbols[0], "BTCUSDT");
        assert_eq!(symbols[4], "SOLUSDT");
    }
}
