//! Adapter for Checkov JSON output (`checkov -o json`).

use crate::adapters::ReportAdapter;
use crate::core::{CorrelateError, RawFinding, ResourceLocator, Result, Tool};
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct CheckovAdapter;

#[derive(Debug, Deserialize)]
struct CheckovReport {
    results: CheckovResults,
}

#[derive(Debug, Deserialize)]
struct CheckovResults {
    failed_checks: Vec<CheckovCheck>,
}

#[derive(Debug, Deserialize)]
struct CheckovCheck {
    check_id: String,
    #[serde(default)]
    check_name: Option<String>,
    /// Absent unless the run is linked to the Checkov platform, so `null`
    /// is a normal value here.
    #[serde(default)]
    severity: Option<String>,
    file_path: String,
    #[serde(default)]
    file_line_range: Option<(usize, usize)>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl ReportAdapter for CheckovAdapter {
    fn tool(&self) -> Tool {
        Tool::Checkov
    }

    fn description(&self) -> &'static str {
        "Infrastructure-as-code policy scanning (Checkov JSON report)"
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<RawFinding>> {
        let report: CheckovReport =
            serde_json::from_slice(raw).map_err(|e| CorrelateError::parse(Tool::Checkov, e))?;

        Ok(report
            .results
            .failed_checks
            .into_iter()
            .map(|check| {
                let mut locator = ResourceLocator::new(&check.file_path);
                if let Some((start, end)) = check.file_line_range {
                    locator = locator.with_span(start, end);
                }
                let raw_severity = check.severity.unwrap_or_else(|| "UNKNOWN".to_string());
                let message = check.check_name.unwrap_or_else(|| check.check_id.clone());
                RawFinding::new(Tool::Checkov, check.check_id, raw_severity, locator, message)
                    .with_extra(check.extra)
            })
            .collect())
    }
}
