use arena_models::snapshot::PriceSnapshot;

/// One indented line per symbol, four decimals, `unavailable` for a zero price.
pub fn format_prices_for_display(snapshot: &PriceSnapshot) -> String {
    snapshot
        .iter()
        .map(|(symbol, price)| {
            if price > 0.0 {
                format!("   {symbol}: ${price:.4}")
            } else {
                format!("   {symbol}: unavailable")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
