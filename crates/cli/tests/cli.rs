use std::fs;
use std::process::Command;
use tempfile::TempDir;

const TFSEC_REPORT: &str = r#"{
    "results": [
        {
            "rule_id": "open-ingress",
            "description": "ingress open to the world",
            "severity": "HIGH",
            "location": {
                "filename": "main.tf",
                "start_line": 12,
                "end_line": 12
            }
        }
    ]
}"#;

const CHECKOV_REPORT: &str = r#"{
    "results": {
        "failed_checks": [
            {
                "check_id": "firewall-too-permissive",
                "check_name": "security group rule permits unrestricted ingress traffic",
                "severity": "CRITICAL",
                "file_path": "/main.tf",
                "file_line_range": [10, 14]
            }
        ]
    }
}"#;

#[test]
fn correlate_merges_reports_into_one_finding() {
    let temp_dir = TempDir::new().unwrap();
    let tfsec_path = temp_dir.path().join("tfsec.json");
    let checkov_path = temp_dir.path().join("checkov.json");
    let output_path = temp_dir.path().join("report.json");

    fs::write(&tfsec_path, TFSEC_REPORT).unwrap();
    fs::write(&checkov_path, CHECKOV_REPORT).unwrap();

    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "crosscheck-cli",
            "--",
            "correlate",
            "--report",
            &format!("tfsec={}", tfsec_path.display()),
            "--report",
            &format!("checkov={}", checkov_path.display()),
            "--output",
            output_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(output_path.exists(), "Report file was not created");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    let findings = report["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1, "both reports describe the same issue");
    assert_eq!(findings[0]["severity"], "critical");
    assert_eq!(findings[0]["category"], "network-exposure");

    let tools = findings[0]["source_tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);

    assert_eq!(report["summary"]["total_findings"], 1);
    assert_eq!(
        report["summary"]["parse_failures"].as_array().unwrap().len(),
        0
    );
}

#[test]
fn correlate_records_malformed_report_and_continues() {
    let temp_dir = TempDir::new().unwrap();
    let tfsec_path = temp_dir.path().join("tfsec.json");
    let broken_path = temp_dir.path().join("broken.json");
    let output_path = temp_dir.path().join("report.json");

    fs::write(&tfsec_path, TFSEC_REPORT).unwrap();
    fs::write(&broken_path, "{not json").unwrap();

    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "crosscheck-cli",
            "--",
            "correlate",
            "--report",
            &format!("tfsec={}", tfsec_path.display()),
            "--report",
            &format!("checkov={}", broken_path.display()),
            "--output",
            output_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "Partial failure should not abort the run: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();

    let failures = report["summary"]["parse_failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["tool"], "checkov");

    assert_eq!(report["findings"].as_array().unwrap().len(), 1);
}

#[test]
fn tools_lists_registered_adapters() {
    let output = Command::new("cargo")
        .args(["run", "-p", "crosscheck-cli", "--", "tools"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tfsec"));
    assert!(stdout.contains("checkov"));
    assert!(stdout.contains("trivy"));
}
