//! crosscheck - cross-tool security findings correlation engine.
//!
//! Independent scanners report the same underlying issues in different
//! schemas, vocabularies, and severity scales. This crate ingests their
//! native JSON reports through per-tool adapters, normalizes everything
//! into one canonical finding model, merges duplicates across tools, and
//! produces a single deterministic, severity-ranked report.

pub mod adapters;
pub mod core;
pub mod runner;

pub use adapters::ReportAdapter;
pub use core::{
    Category, CorrelateError, CorrelationConfig, Correlator, Finding, LineSpan, ParseFailure,
    RawFinding, Report, ResourceLocator, Severity, SimilarityWeights, Summary, Tool,
    REPORT_VERSION,
};
pub use runner::{AdapterRegistry, Pipeline, ReportInput};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
