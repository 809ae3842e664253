use std::fmt::Write;

use arena_models::snapshot::{default_symbols, PriceSnapshot, Symbol};

/// System message sent alongside every decision prompt.
pub const SYSTEM_PROMPT: &str = "You are a professional quantitative trading analyst. \
     Give a trading decision based on the market data you are shown.";

/// Renders a price snapshot into the decision prompt for a fixed, ordered
/// list of symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    symbols: Vec<Symbol>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(default_symbols())
    }
}

impl PromptBuilder {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Pure function of the snapshot. Prices use four decimals; symbols the
    /// snapshot lacks are shown as zero.
    pub fn build(&self, snapshot: &PriceSnapshot) -> String {
        let mut prices = String::new();
        for symbol in &self.symbols {
            let _ = writeln!(prices, "- {symbol}: ${:.4}", snapshot.price(symbol));
        }

        let mut choices = self.symbols.join("|");
        if !choices.is_empty() {
            choices.push('|');
        }
        choices.push_str("null");

        format!(
            "You are a professional quantitative trading analyst. Based on the current \
             market prices, give one trading decision.\n\n\
             Current market prices:\n\
             {prices}\n\
             Return your trading decision as JSON:\n\
             {{\n    \
             \"symbol\": \"{choices}\",\n    \
             \"action\": \"BUY|SELL|HOLD\",\n    \
             \"confidence\": 0.0-1.0,\n    \
             \"rationale\": \"short reason (50 words at most)\"\n\
             }}\n\n\
             Rules:\n\
             1. Return ONLY the JSON, no other text\n\
             2. symbol null means no instrument is selected\n\
             3. action HOLD means hold / wait\n\
             4. confidence is your confidence in the decision\n\
             5. rationale explains the decision\n\n\
             JSON:\n"
        )
    }
}

/// Build the decision prompt for the default symbol list.
pub fn build_prompt(snapshot: &PriceSnapshot) -> String {
    PromptBuilder::default().build(snapshot)
}
