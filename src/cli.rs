//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_generate_summary, format_relations_json, format_relations_text, format_state_json,
    format_state_text, GenerateSummary,
};
pub use route::RunContext;
