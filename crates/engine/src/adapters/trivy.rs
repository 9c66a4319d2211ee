//! Adapter for Trivy JSON output (schema version 2).

use crate::adapters::{null_as_empty, ReportAdapter};
use crate::core::{CorrelateError, RawFinding, ResourceLocator, Result, Tool};
use serde::Deserialize;
use std::collections::BTreeMap;

pub struct TrivyAdapter;

#[derive(Debug, Deserialize)]
struct TrivyReport {
    /// Anchor field of the v2 schema; its absence means the payload is not
    /// a Trivy report.
    #[serde(rename = "SchemaVersion")]
    #[allow(dead_code)]
    schema_version: u32,

    #[serde(rename = "Results", default, deserialize_with = "null_as_empty")]
    results: Vec<TrivyResult>,
}

#[derive(Debug, Deserialize)]
struct TrivyResult {
    #[serde(rename = "Target")]
    target: String,

    #[serde(rename = "Vulnerabilities", default, deserialize_with = "null_as_empty")]
    vulnerabilities: Vec<TrivyVulnerability>,
}

#[derive(Debug, Deserialize)]
struct TrivyVulnerability {
    #[serde(rename = "VulnerabilityID")]
    vulnerability_id: String,

    #[serde(rename = "Severity")]
    severity: String,

    #[serde(rename = "Title", default)]
    title: Option<String>,

    #[serde(rename = "Description", default)]
    description: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl ReportAdapter for TrivyAdapter {
    fn tool(&self) -> Tool {
        Tool::Trivy
    }

    fn description(&self) -> &'static str {
        "Dependency and vulnerability scanning (Trivy JSON report)"
    }

    fn parse(&self, raw: &[u8]) -> Result<Vec<RawFinding>> {
        let report: TrivyReport =
            serde_json::from_slice(raw).map_err(|e| CorrelateError::parse(Tool::Trivy, e))?;

        let mut findings = Vec::new();
        for result in report.results {
            // The target is a logical resource name (lockfile, image layer),
            // so the locator carries no line span.
            let locator = ResourceLocator::new(&result.target);
            for vuln in result.vulnerabilities {
                let message = vuln
                    .title
                    .or(vuln.description)
                    .unwrap_or_else(|| vuln.vulnerability_id.clone());
                findings.push(
                    RawFinding::new(
                        Tool::Trivy,
                        vuln.vulnerability_id,
                        vuln.severity,
                        locator.clone(),
                        message,
                    )
                    .with_extra(vuln.extra),
                );
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Category, Severity};

    const SAMPLE: &str = r#"{
        "SchemaVersion": 2,
        "ArtifactName": ".",
        "Results": [
            {
                "Target": "Cargo.lock",
                "Class": "lang-pkgs",
                "Type": "cargo",
                "Vulnerabilities": [
                    {
                        "VulnerabilityID": "CVE-2021-44228",
                        "PkgName": "log4j-core",
                        "InstalledVersion": "2.14.0",
                        "Severity": "CRITICAL",
                        "Title": "log4j: remote code execution via JNDI lookup",
                        "PrimaryURL": "https://avd.aquasec.com/nvd/cve-2021-44228"
                    }
                ]
            },
            {
                "Target": "requirements.txt",
                "Class": "lang-pkgs",
                "Type": "pip"
            }
        ]
    }"#;

    #[test]
    fn parses_vulnerabilities_per_target() {
        let findings = TrivyAdapter.parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(findings.len(), 1);

        let finding = &findings[0];
        assert_eq!(finding.tool, Tool::Trivy);
        assert_eq!(finding.rule_id, "CVE-2021-44228");
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.category, Category::DependencyVulnerability);
        assert_eq!(finding.locator.path, "Cargo.lock");
        assert!(finding.locator.span.is_none());
        assert!(finding.message.contains("log4j"));
    }

    #[test]
    fn package_details_pass_through() {
        let findings = TrivyAdapter.parse(SAMPLE.as_bytes()).unwrap();
        let extra = &findings[0].extra;
        assert_eq!(extra["PkgName"], serde_json::json!("log4j-core"));
        assert!(extra.contains_key("InstalledVersion"));
        assert!(extra.contains_key("PrimaryURL"));
    }

    #[test]
    fn target_without_vulnerabilities_is_clean() {
        let findings = TrivyAdapter
            .parse(br#"{"SchemaVersion": 2, "Results": [{"Target": "app.jar"}]}"#)
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_results_is_still_a_valid_report() {
        let findings = TrivyAdapter.parse(br#"{"SchemaVersion": 2}"#).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_schema_version_is_a_parse_error() {
        let err = TrivyAdapter.parse(br#"{"Results": []}"#).unwrap_err();
        assert!(matches!(err, CorrelateError::Parse { .. }));
        assert!(err.to_string().contains("trivy"));
    }
}
