use arena_models::decision::Decision;
use arena_models::report::{ComparisonEntry, ComparisonResult, SourceDecision, Verdict};

/// Two decisions agree when they name the same symbol (both `None` counts)
/// and the same action. Confidence and rationale are ignored.
pub fn agree(a: &Decision, b: &Decision) -> bool {
    a.same_symbol(b) && a.action == b.action
}

/// Compare named decisions, preserving their order in the listing.
///
/// The verdict is only defined for exactly two decisions; any other count
/// gives `Verdict::NotApplicable`.
pub fn compare<'a, I>(decisions: I) -> ComparisonResult
where
    I: IntoIterator<Item = (&'a str, &'a Decision)>,
{
    let decisions: Vec<(&str, &Decision)> = decisions.into_iter().collect();

    let entries = decisions
        .iter()
        .map(|(source, decision)| ComparisonEntry {
            source: source.to_string(),
            symbol: decision.symbol.clone(),
            action: decision.action,
        })
        .collect();

    let verdict = match decisions.as_slice() {
        [(_, a), (_, b)] if agree(a, b) => Verdict::Agree,
        [_, _] => Verdict::Disagree,
        _ => Verdict::NotApplicable,
    };

    ComparisonResult { entries, verdict }
}

pub fn compare_sources(decisions: &[SourceDecision]) -> ComparisonResult {
    compare(
        decisions
            .iter()
            .map(|d| (d.source.name.as_str(), &d.decision)),
    )
}
