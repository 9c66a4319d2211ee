//! Adapter for tfsec JSON output (`tfsec --format json`).

use crate::adapters::{null_as_empty, ReportAdapter};
use crate::core::{CorrelateError, RawFinding, ResourceLocator, Result, Tool};
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct TfsecAdapter;

#[derive(Debug, Deserialize)]
struct TfsecReport {
    #[serde(deserialize_with = "null_as_empty")]
    results: Vec<TfsecResult>,
}

#[derive(Debug, Deserialize)]
struct TfsecResult {
    rule_id: String,
    #[serde(default)]
    rule_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
    severity: String,
    location: TfsecLocation,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TfsecLocation {
    filename: String,
    start_line: usize,
    end_line: usize,
}

impl ReportAdapter for TfsecAdapter {
    fn tool(&self) -> Tool {
        Tool::Tfsec
    }

    fn description(&self) -> &'static str {
        "Terraform static analysis (tfsec JSON report)"
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<RawFinding>> {
        let report: TfsecReport =
            serde_json::from_slice(raw).map_err(|e| CorrelateError::parse(Tool::Tfsec, e))?;

        Ok(report
            .results
            .into_iter()
            .map(|result| {
                let locator = ResourceLocator::new(&result.location.filename)
                    .with_span(result.location.start_line, result.location.end_line);
                let message = result
                    .description
                    .or(result.rule_description)
                    .unwrap_or_else(|| result.rule_id.clone());
                RawFinding::new(Tool::Tfsec, result.rule_id, result.severity, locator, message)
                    .with_extra(result.extra)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, Severity};

    const SAMPLE: &str = r#"{
        "results": [
            {
                "rule_id": "aws-vpc-no-public-ingress-sgr",
                "rule_description": "An ingress security group rule allows traffic from /0.",
                "description": "Security group rule allows ingress from public internet.",
                "severity": "HIGH",
                "impact": "Your port exposed to the internet",
                "resolution": "Set a more restrictive cidr range",
                "location": {
                    "filename": "./main.tf",
                    "start_line": 10,
                    "end_line": 14
                }
            }
        ]
    }"#;

    #[test]
    fn parses_findings_with_normalized_locator() {
        let findings = TfsecAdapter.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.tool, Tool::Tfsec);
        assert_eq!(finding.rule_id, "aws-vpc-no-public-ingress-sgr");
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.category, Category::NetworkExposure);
        assert_eq!(finding.locator.path, "main.tf");
        assert_eq!(finding.locator.span.unwrap().start, 10);
        assert_eq!(finding.locator.span.unwrap().end, 14);
    }

    #[test]
    fn uninterpreted_fields_pass_through() {
        let findings = TfsecAdapter.parse(SAMPLE.as_bytes()).unwrap();
        let extra = &findings[0].extra;
        assert_eq!(
            extra["impact"],
            serde_json::json!("Your port exposed to the internet")
        );
        assert!(extra.contains_key("resolution"));
    }

    #[test]
    fn null_results_is_a_clean_scan() {
        let findings = TfsecAdapter.parse(br#"{"results": null}"#).unwrap();
        assert!(findings.is_empty());

        let findings = TfsecAdapter.parse(br#"{"results": []}"#).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_results_field_is_a_parse_error() {
        let err = TfsecAdapter.parse(br#"{"version": "1.28"}"#).unwrap_err();
        assert!(matches!(err, CorrelateError::Parse { .. }));
        assert!(err.to_string().contains("tfsec"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = TfsecAdapter.parse(b"{not json").unwrap_err();
        assert!(matches!(err, CorrelateError::Parse { .. }));
    }
}
