use std::borrow::Cow;

use arena_models::decision::{Action, Decision, FieldRepair};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::DecisionParseError;

const FENCE: &str = "```";

/// Non-standard number literals some models emit, longest first.
const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Confidence substituted for a non-numeric or out-of-range value.
pub const REPAIRED_CONFIDENCE: f64 = 0.5;

/// A decision accepted from a response, with any in-place repairs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDecision {
    pub decision: Decision,
    pub repairs: Vec<FieldRepair>,
}

/// Remove one code-fence wrapping from a model response.
///
/// The opening is a triple backtick followed by an optional language tag
/// (`json`, `JSON`, ...), the closing a bare triple backtick. Either side
/// may appear alone.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        // Skip the language tag, if any
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }
    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Turn bare `NaN`, `Infinity` and `-Infinity` outside string literals into
/// JSON strings so the rest of the object still parses. Such a confidence is
/// then repaired like any other non-numeric value.
pub fn quote_non_finite(body: &str) -> Cow<'_, str> {
    if !NON_FINITE.iter().any(|token| body.contains(token)) {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len() + 8);
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = body;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE
            .iter()
            .find(|token| rest.starts_with(*token) && !continues_word(&rest[token.len()..]))
        {
            if !continues_word_before(&out) {
                out.push('"');
                out.push_str(token);
                out.push('"');
                rest = &rest[token.len()..];
                continue;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

fn continues_word(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn continues_word_before(before: &str) -> bool {
    before
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Parse a model response, rejecting it when it is not a JSON object with
/// all four decision fields.
///
/// `action` and `confidence` are repaired rather than rejected. `symbol` and
/// `rationale` are taken as given: strings verbatim, `null` symbol as no
/// symbol, and any other JSON value as its compact JSON text.
pub fn parse_decision_checked(raw: &str) -> Result<ParsedDecision, DecisionParseError> {
    let body = quote_non_finite(strip_code_fence(raw));
    let value: Value = serde_json::from_str(&body)?;
    let Value::Object(fields) = value else {
        return Err(DecisionParseError::NotAnObject);
    };

    let symbol = field(&fields, "symbol")?;
    let action = field(&fields, "action")?;
    let confidence = field(&fields, "confidence")?;
    let rationale = field(&fields, "rationale")?;

    let mut repairs = Vec::new();

    let action = match action.as_str().and_then(Action::from_wire) {
        Some(action) => action,
        None => {
            repairs.push(FieldRepair::Action {
                found: action.clone(),
            });
            Action::Hold
        }
    };

    let confidence = match confidence.as_f64().filter(|c| (0.0..=1.0).contains(c)) {
        Some(confidence) => confidence,
        None => {
            repairs.push(FieldRepair::Confidence {
                found: confidence.clone(),
            });
            REPAIRED_CONFIDENCE
        }
    };

    let (symbol, raw_symbol) = match symbol {
        Value::Null => (None, None),
        Value::String(s) => (Some(s.clone()), None),
        other => (Some(other.to_string()), Some(other.clone())),
    };

    let rationale = match rationale {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(ParsedDecision {
        decision: Decision {
            symbol,
            action,
            confidence,
            rationale,
            raw_symbol,
        },
        repairs,
    })
}

fn field<'a>(
    fields: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a Value, DecisionParseError> {
    fields
        .get(name)
        .ok_or(DecisionParseError::MissingField(name))
}

/// Parse a model response into a decision. Never fails: any rejected
/// response yields `Decision::default()`.
pub fn parse_decision(raw: &str) -> Decision {
    match parse_decision_checked(raw) {
        Ok(parsed) => {
            for repair in &parsed.repairs {
                warn!(%repair, "Repaired decision field");
            }
            parsed.decision
        }
        Err(e) => {
            warn!(error = %e, length = raw.len(), "Rejected model response");
            debug!(raw = %raw, "Rejected response text");
            Decision::default()
        }
    }
}
