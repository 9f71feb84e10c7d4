#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Rule-driven extraction of perioperative insight records from free-text
//! clinical notes.

pub mod engine;
pub mod extractors;
pub mod preprocess;
pub mod rules;

pub use engine::{Document, ExtractionConfig, InsightExtractor};
pub use extractors::RuleGroup;
pub use preprocess::clean_text;
pub use rules::{
    BuildError, Collect, CompiledRule, FormatDef, MatcherDef, RuleDef, Transform, default_rules,
    title_case,
};
