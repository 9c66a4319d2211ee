//! The unified output document.
//!
//! Findings are held in a total order (severity descending, id ascending)
//! and the JSON rendering is byte-stable across runs on identical input.
//! Anything non-deterministic (generation timestamp, engine version) lives
//! in the optional `metadata` block, which is omitted unless the caller
//! asks for it.

use crate::core::{Category, Finding, Severity};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema version of the emitted document.
pub const REPORT_VERSION: &str = "1";

/// One input report that could not be ingested: the tool and file named so
/// operators can tell "clean scan" from "scanner didn't run".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseFailure {
    pub tool: String,
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCount {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCount {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total_findings: usize,

    pub by_severity: SeverityCount,

    pub by_category: BTreeMap<Category, usize>,

    /// Adapter-level failures in original input order.
    pub parse_failures: Vec<ParseFailure>,
}

/// Generation details outside the deterministic comparison scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub version: String,

    pub findings: Vec<Finding>,

    pub summary: Summary,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub metadata: Option<RunMetadata>,
}

impl Report {
    pub fn new(mut findings: Vec<Finding>, parse_failures: Vec<ParseFailure>) -> Self {
        findings.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.id.cmp(&b.id)));

        let mut by_severity = SeverityCount::default();
        let mut by_category = BTreeMap::new();
        for finding in &findings {
            by_severity.record(finding.severity);
            *by_category.entry(finding.category).or_insert(0) += 1;
        }

        let summary = Summary {
            total_findings: findings.len(),
            by_severity,
            by_category,
            parse_failures,
        };

        Self {
            version: REPORT_VERSION.to_string(),
            findings,
            summary,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, generated_at: DateTime<Utc>, engine_version: String) -> Self {
        self.metadata = Some(RunMetadata {
            generated_at,
            engine_version,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Correlated Findings Report\n\n");

        if let Some(ref metadata) = self.metadata {
            md.push_str(&format!(
                "**Generated**: {}\n**Engine**: {}\n\n",
                metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                metadata.engine_version
            ));
        }

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- Total findings: {}\n", self.summary.total_findings));
        md.push_str(&format!("- Critical: {}\n", self.summary.by_severity.critical));
        md.push_str(&format!("- High: {}\n", self.summary.by_severity.high));
        md.push_str(&format!("- Medium: {}\n", self.summary.by_severity.medium));
        md.push_str(&format!("- Low: {}\n", self.summary.by_severity.low));
        md.push_str(&format!("- Info: {}\n\n", self.summary.by_severity.info));

        if !self.summary.by_category.is_empty() {
            md.push_str("## By Category\n\n");
            for (category, count) in &self.summary.by_category {
                md.push_str(&format!("- {}: {}\n", category, count));
            }
            md.push('\n');
        }

        if !self.summary.parse_failures.is_empty() {
            md.push_str("## Parse Failures\n\n");
            for failure in &self.summary.parse_failures {
                md.push_str(&format!(
                    "- `{}` ({}): {}\n",
                    failure.file, failure.tool, failure.error
                ));
            }
            md.push('\n');
        }

        if !self.findings.is_empty() {
            md.push_str("## Findings\n\n");
            for finding in &self.findings {
                md.push_str(&format!(
                    "### {} [{}] {}\n\n",
                    finding.severity, finding.category, finding.id
                ));
                md.push_str(&format!("{}\n\n", finding.description));
                md.push_str(&format!("- **Location**: {}\n", finding.locator));
                md.push_str(&format!(
                    "- **Reported by**: {}\n",
                    finding
                        .source_tools
                        .iter()
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
                for (tool, rules) in &finding.rule_ids {
                    md.push_str(&format!("- **{} rules**: {}\n", tool, rules.join(", ")));
                }
                md.push('\n');
            }
        }

        md
    }
}
