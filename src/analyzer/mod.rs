//! The analysis pipeline: rule engine adapter, extended heuristic checks,
//! and the aggregator that sequences them over one rendered page.

pub mod aggregate;
pub mod axe;
pub mod extended;

pub use aggregate::{analyze_url, run_analysis};
