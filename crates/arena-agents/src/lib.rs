pub mod backend;
pub mod claude_cli;
pub mod consensus;
pub mod decision_maker;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod providers;

pub mod test_support;

pub use backend::ModelBackend;
pub use consensus::{compare, compare_sources};
pub use decision_maker::{format_for_display, DecisionMaker};
pub use error::{AgentError, DecisionParseError};
pub use orchestrator::Orchestrator;
pub use parser::{parse_decision, parse_decision_checked, ParsedDecision};
pub use prompts::{build_prompt, PromptBuilder, SYSTEM_PROMPT};
pub use providers::create_backend;
