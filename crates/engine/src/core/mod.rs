//! Core model and correlation machinery.
//!
//! The canonical finding model, the normalization tables that map each
//! tool's vocabulary onto it, the fingerprint scheme that pairs findings
//! across tools, the clustering stage that merges them, and the report
//! document that carries the result.

pub mod category;
pub mod correlation;
pub mod error;
pub mod finding;
pub mod fingerprint;
pub mod report;
pub mod severity;
pub mod tables;

pub use category::Category;
pub use correlation::Correlator;
pub use error::{CorrelateError, Result};
pub use finding::{Finding, LineSpan, RawFinding, ResourceLocator, Tool};
pub use fingerprint::{CorrelationConfig, PrimaryKey, SimilarityWeights};
pub use report::{ParseFailure, Report, RunMetadata, SeverityCount, Summary, REPORT_VERSION};
pub use severity::Severity;
