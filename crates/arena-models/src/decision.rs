use std::fmt;

use serde::{Deserialize, Serialize};

/// Rationale carried by the fallback decision.
pub const DEFAULT_RATIONALE: &str = "Response could not be parsed; holding by default";

/// The trading action a model recommends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Exact, case-sensitive match against the wire spelling.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            "HOLD" => Some(Self::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized trading decision produced from one model response.
///
/// Serializes to the wire shape models are asked to emit:
/// `{"symbol": string|null, "action": "BUY"|"SELL"|"HOLD", "confidence": number, "rationale": string}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    /// `None` means no instrument was selected. Never checked against the
    /// configured symbol list.
    pub symbol: Option<String>,
    pub action: Action,
    /// Within [0.0, 1.0] for every decision produced by the parser.
    pub confidence: f64,
    /// Advisory free text.
    pub rationale: String,
    /// The symbol as sent when it was neither a string nor `null`; `symbol`
    /// then holds its compact JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_symbol: Option<serde_json::Value>,
}

impl Decision {
    pub fn new(
        symbol: Option<&str>,
        action: Action,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.map(str::to_string),
            action,
            confidence,
            rationale: rationale.into(),
            raw_symbol: None,
        }
    }

    /// Symbol equality that tells `1` apart from `"1"`.
    pub fn same_symbol(&self, other: &Decision) -> bool {
        self.symbol == other.symbol && self.raw_symbol == other.raw_symbol
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// The fallback decision used whenever a response cannot be turned into a
/// structurally valid decision.
impl Default for Decision {
    fn default() -> Self {
        Self {
            symbol: None,
            action: Action::Hold,
            confidence: 0.0,
            rationale: DEFAULT_RATIONALE.to_string(),
            raw_symbol: None,
        }
    }
}

/// A field the parser replaced in place instead of rejecting the response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldRepair {
    /// `action` was not one of BUY/SELL/HOLD; replaced with HOLD.
    Action { found: serde_json::Value },
    /// `confidence` was not a number in [0, 1]; replaced with 0.5.
    Confidence { found: serde_json::Value },
}

impl fmt::Display for FieldRepair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action { found } => write!(f, "invalid action {found}, replaced with HOLD"),
            Self::Confidence { found } => {
                write!(f, "invalid confidence {found}, replaced with 0.5")
            }
        }
    }
}

/// A named decision producer. `model` is for display and logging only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ModelSource {
    pub name: String,
    pub model: String,
}

impl ModelSource {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_spelling_is_uppercase() {
        assert_eq!(serde_json::to_string(&Action::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Action::Hold).unwrap(), "\"HOLD\"");
        let parsed: Action = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(parsed, Action::Sell);
    }

    #[test]
    fn from_wire_is_case_sensitive() {
        assert_eq!(Action::from_wire("BUY"), Some(Action::Buy));
        assert_eq!(Action::from_wire("buy"), None);
        assert_eq!(Action::from_wire(" HOLD"), None);
        assert_eq!(Action::from_wire("MAYBE"), None);
    }

    #[test]
    fn default_decision_is_hold_with_zero_confidence() {
        let decision = Decision::default();
        assert_eq!(decision.symbol, None);
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.confidence, 0.0);
        assert_eq!(decision.rationale, DEFAULT_RATIONALE);
        assert!(decision.is_default());
    }

    #[test]
    fn decision_serializes_to_wire_shape() {
        let decision = Decision::new(Some("ETHUSDT"), Action::Buy, 0.8, "momentum");
        let value = serde_json::to_value(&decision).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "symbol": "ETHUSDT",
                "action": "BUY",
                "confidence": 0.8,
                "rationale": "momentum"
            })
        );

        let none = serde_json::to_value(Decision::default()).unwrap();
        assert!(none["symbol"].is_null());
    }

    #[test]
    fn numeric_symbol_differs_from_its_text() {
        let text = Decision::new(Some("1"), Action::Buy, 0.5, "");
        let number = Decision {
            raw_symbol: Some(serde_json::json!(1)),
            ..text.clone()
        };
        assert!(text.same_symbol(&text));
        assert!(number.same_symbol(&number.clone()));
        assert!(!text.same_symbol(&number));
        assert!(!number.same_symbol(&text));
    }

    #[test]
    fn repair_serializes_with_field_tag() {
        let repair = FieldRepair::Confidence {
            found: serde_json::json!(1.5),
        };
        let value = serde_json::to_value(&repair).unwrap();
        assert_eq!(value["field"], "confidence");
        assert_eq!(value["found"], 1.5);
        assert_eq!(repair.to_string(), "invalid confidence 1.5, replaced with 0.5");
    }

    #[test]
    fn model_source_display() {
        let source = ModelSource::new("OpenAI", "gpt-4");
        assert_eq!(source.to_string(), "OpenAI (gpt-4)");
    }
}
