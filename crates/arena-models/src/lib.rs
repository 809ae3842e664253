pub mod config;
pub mod decision;
pub mod report;
pub mod snapshot;

pub use config::{ArenaConfig, ExchangeKind, MarketConfig, ProviderKind, RoundConfig, SourceConfig};
pub use decision::{Action, Decision, FieldRepair, ModelSource, DEFAULT_RATIONALE};
pub use report::{
    ComparisonEntry, ComparisonResult, DecisionOutcome, RoundReport, SourceDecision, Verdict,
};
pub use snapshot::{default_symbols, PriceSnapshot, Symbol, SymbolPrice, DEFAULT_SYMBOLS};
