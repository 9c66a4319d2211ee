//! Scanner report adapters.
//!
//! One adapter per supported tool family, each translating that tool's
//! native JSON report into raw findings. Adapters are purely structural:
//! they extract rule id, severity string, locator, and message, and carry
//! every uninterpreted field through in the finding's `extra` map. They
//! never look at other tools' output; all cross-tool reasoning happens in
//! the correlation stage.

pub mod checkov;
pub mod tfsec;
pub mod trivy;

pub use checkov::CheckovAdapter;
pub use tfsec::TfsecAdapter;
pub use trivy::TrivyAdapter;

use crate::core::{RawFinding, Result, Tool};
use serde::{Deserialize, Deserializer};

/// Structural translation of one tool's native report format.
///
/// `parse` fails with a parse error when the payload is not valid syntax for
/// the tool's declared format (malformed JSON, or a required top-level field
/// missing). A report with zero findings is a valid empty sequence, not an
/// error.
pub trait ReportAdapter: Send + Sync {
    fn tool(&self) -> Tool;

    fn description(&self) -> &'static str;

    fn parse(&self, raw: &[u8]) -> Result<Vec<RawFinding>>;
}

/// Deserialize a field that must be present but may be `null` (several
/// tools emit `"results": null` for a clean scan).
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
