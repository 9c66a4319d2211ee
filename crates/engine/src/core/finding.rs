use crate::core::error::CorrelateError;
use crate::core::{tables, Category, Severity};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Scanner families with a registered adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Tfsec,
    Checkov,
    Trivy,
}

impl Tool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tfsec => "tfsec",
            Self::Checkov => "checkov",
            Self::Trivy => "trivy",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Tfsec, Tool::Checkov, Tool::Trivy]
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tool {
    type Err = CorrelateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tfsec" => Ok(Tool::Tfsec),
            "checkov" => Ok(Tool::Checkov),
            "trivy" => Ok(Tool::Trivy),
            other => Err(CorrelateError::UnsupportedTool(other.to_string())),
        }
    }
}

/// Inclusive line range within the located artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn single(line: usize) -> Self {
        Self { start: line, end: line }
    }

    pub fn overlaps(&self, other: &LineSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest span enclosing both.
    pub fn enclose(&self, other: &LineSpan) -> LineSpan {
        LineSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Line distance between two non-overlapping spans; 0 when they overlap.
    pub fn gap(&self, other: &LineSpan) -> usize {
        if self.overlaps(other) {
            0
        } else if self.end < other.start {
            other.start - self.end
        } else {
            self.start - other.end
        }
    }
}

/// Normalized identifier of the affected artifact: a relative path (or
/// logical resource name) plus an optional line span.
///
/// Two findings with different paths never merge, whatever their textual
/// similarity; the path is the hard gate of the whole correlation stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLocator {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub span: Option<LineSpan>,
}

impl ResourceLocator {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            span: None,
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(LineSpan::new(start, end));
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.span = Some(LineSpan::single(line));
        self
    }
}

impl fmt::Display for ResourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) if span.start == span.end => write!(f, "{}:{}", self.path, span.start),
            Some(span) => write!(f, "{}:{}-{}", self.path, span.start, span.end),
            None => write!(f, "{}", self.path),
        }
    }
}

/// Make tool-reported paths comparable: forward slashes, no leading `./`
/// or absolute-root prefix.
fn normalize_path(raw: &str) -> String {
    let mut path = raw.trim().replace('\\', "/");
    while path.starts_with("./") {
        path.drain(..2);
    }
    path.trim_start_matches('/').to_string()
}

/// One unreconciled issue record as emitted by a single scanner adapter.
///
/// Immutable once parsed; the correlation stage reads these, it never
/// rewrites them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFinding {
    pub tool: Tool,

    pub rule_id: String,

    /// The severity string exactly as the tool reported it.
    pub raw_severity: String,

    pub severity: Severity,

    pub category: Category,

    pub locator: ResourceLocator,

    pub message: String,

    /// Fields of the native record this engine does not interpret,
    /// preserved verbatim for audit.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawFinding {
    pub fn new(
        tool: Tool,
        rule_id: impl Into<String>,
        raw_severity: impl Into<String>,
        locator: ResourceLocator,
        message: impl Into<String>,
    ) -> Self {
        let rule_id = rule_id.into();
        let raw_severity = raw_severity.into();
        let severity = tables::severity_for(tool, &raw_severity);
        let category = tables::category_for(tool, &rule_id);
        Self {
            tool,
            rule_id,
            raw_severity,
            severity,
            category,
            locator,
            message: message.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, extra: BTreeMap<String, serde_json::Value>) -> Self {
        self.extra = extra;
        self
    }
}

/// One reconciled, canonical security issue record: the merge of every raw
/// finding in a correlation cluster.
///
/// Immutable once emitted; re-running the pipeline produces a new finding
/// set rather than updating this one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Deterministic identifier: a pure function of locator, category, and
    /// the sorted set of contributing `tool:rule` pairs.
    pub id: String,

    /// Names of every tool that reported a constituent. Never empty.
    pub source_tools: BTreeSet<String>,

    /// Per-tool rule codes, retained for traceability.
    pub rule_ids: BTreeMap<String, Vec<String>>,

    pub locator: ResourceLocator,

    pub category: Category,

    pub severity: Severity,

    pub description: String,

    /// The raw per-tool records this finding was built from, owned
    /// exclusively by the reconciled finding and kept for audit.
    pub raw_refs: Vec<RawFinding>,
}

impl Finding {
    /// Derive the stable id for a cluster.
    ///
    /// SHA-256 over the normalized locator, the category, and the sorted
    /// `tool:rule` pairs, so identical inputs always produce identical ids
    /// regardless of input file order.
    pub fn derive_id(
        locator: &ResourceLocator,
        category: Category,
        rule_pairs: &BTreeSet<String>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(locator.path.as_bytes());
        if let Some(span) = locator.span {
            hasher.update(format!(":{}-{}", span.start, span.end).as_bytes());
        }
        hasher.update(b"|");
        hasher.update(category.as_str().as_bytes());
        for pair in rule_pairs {
            hasher.update(b"|");
            hasher.update(pair.as_bytes());
        }
        let digest = hasher.finalize();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        hex[..16].to_string()
    }
}
