//! Process-wide normalization tables: per-tool severity scales, rule-id
//! category assignments, and cross-tool rule-equivalence families.
//!
//! Built once on first use and read-only for the rest of the process, so
//! concurrent pipeline runs share them without synchronization.

use crate::core::{Category, Severity, Tool};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

fn severity_table() -> &'static HashMap<Tool, HashMap<&'static str, Severity>> {
    static TABLE: OnceLock<HashMap<Tool, HashMap<&'static str, Severity>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();

        for tool in Tool::all() {
            let mut scale = HashMap::new();
            scale.insert("CRITICAL", Severity::Critical);
            scale.insert("HIGH", Severity::High);
            scale.insert("MEDIUM", Severity::Medium);
            scale.insert("LOW", Severity::Low);
            table.insert(*tool, scale);
        }

        let checkov = table.get_mut(&Tool::Checkov).expect("all tools inserted");
        checkov.insert("INFO", Severity::Info);
        checkov.insert("UNKNOWN", Severity::Info);

        let trivy = table.get_mut(&Tool::Trivy).expect("all tools inserted");
        trivy.insert("UNKNOWN", Severity::Info);

        table
    })
}

/// Map a tool's native severity string onto the canonical scale.
///
/// Unknown strings normalize to `Info` rather than being dropped, so the
/// constituent still participates in fail-safe aggregation.
pub fn severity_for(tool: Tool, raw: &str) -> Severity {
    let key = raw.trim().to_ascii_uppercase();
    let known = severity_table()
        .get(&tool)
        .and_then(|scale| scale.get(key.as_str()));
    match known {
        Some(severity) => *severity,
        None => {
            warn!(tool = %tool, raw, "unrecognized severity string, treating as info");
            Severity::Info
        }
    }
}

fn category_table() -> &'static HashMap<Tool, HashMap<&'static str, Category>> {
    static TABLE: OnceLock<HashMap<Tool, HashMap<&'static str, Category>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut tfsec = HashMap::new();
        tfsec.insert("aws-vpc-no-public-ingress-sgr", Category::NetworkExposure);
        tfsec.insert("aws-ec2-no-public-ingress-sgr", Category::NetworkExposure);
        tfsec.insert("aws-ec2-no-public-egress-sgr", Category::NetworkExposure);
        tfsec.insert("aws-s3-block-public-acls", Category::AccessControl);
        tfsec.insert("aws-iam-no-policy-wildcards", Category::AccessControl);
        tfsec.insert("aws-s3-enable-bucket-encryption", Category::Misconfiguration);
        tfsec.insert(
            "aws-rds-encrypt-instance-storage-data",
            Category::Misconfiguration,
        );
        tfsec.insert(
            "general-secrets-no-plaintext-exposure",
            Category::SecretExposure,
        );

        let mut checkov = HashMap::new();
        checkov.insert("CKV_AWS_24", Category::NetworkExposure);
        checkov.insert("CKV_AWS_25", Category::NetworkExposure);
        checkov.insert("CKV_AWS_260", Category::NetworkExposure);
        checkov.insert("CKV_AWS_40", Category::AccessControl);
        checkov.insert("CKV_AWS_53", Category::AccessControl);
        checkov.insert("CKV_AWS_54", Category::AccessControl);
        checkov.insert("CKV_AWS_55", Category::AccessControl);
        checkov.insert("CKV_AWS_56", Category::AccessControl);
        checkov.insert("CKV_AWS_19", Category::Misconfiguration);
        checkov.insert("CKV_AWS_21", Category::Misconfiguration);

        let mut table = HashMap::new();
        table.insert(Tool::Tfsec, tfsec);
        table.insert(Tool::Checkov, checkov);
        table.insert(Tool::Trivy, HashMap::new());
        table
    })
}

/// Generic rule codes that carry the same meaning whichever tool emits them.
const GENERIC_RULES: &[(&str, Category)] = &[
    ("open-ingress", Category::NetworkExposure),
    ("firewall-too-permissive", Category::NetworkExposure),
    ("public-egress", Category::NetworkExposure),
];

/// Rule-id prefixes with a fixed meaning, applied after exact lookups.
const PREFIX_RULES: &[(&str, Category)] = &[
    ("CVE-", Category::DependencyVulnerability),
    ("GHSA-", Category::DependencyVulnerability),
    ("CKV_SECRET", Category::SecretExposure),
];

/// Classify a rule id. Exact (tool, rule) entries win, then tool-agnostic
/// generic codes, then prefix rules; anything else is `Uncategorized`.
pub fn category_for(tool: Tool, rule_id: &str) -> Category {
    if let Some(category) = category_table()
        .get(&tool)
        .and_then(|rules| rules.get(rule_id))
    {
        return *category;
    }
    if let Some((_, category)) = GENERIC_RULES.iter().find(|(code, _)| *code == rule_id) {
        return *category;
    }
    if let Some((_, category)) = PREFIX_RULES
        .iter()
        .find(|(prefix, _)| rule_id.starts_with(prefix))
    {
        return *category;
    }
    Category::Uncategorized
}

/// Known cross-tool equivalences: each family lists rule codes that describe
/// the same underlying issue under different tools' vocabularies.
const RULE_FAMILIES: &[&[&str]] = &[
    &[
        "open-ingress",
        "firewall-too-permissive",
        "aws-vpc-no-public-ingress-sgr",
        "aws-ec2-no-public-ingress-sgr",
        "CKV_AWS_24",
        "CKV_AWS_25",
        "CKV_AWS_260",
    ],
    &["aws-s3-enable-bucket-encryption", "CKV_AWS_19"],
    &[
        "aws-s3-block-public-acls",
        "CKV_AWS_53",
        "CKV_AWS_54",
        "CKV_AWS_55",
        "CKV_AWS_56",
    ],
    &["aws-iam-no-policy-wildcards", "CKV_AWS_40", "CKV_AWS_111"],
    &["general-secrets-no-plaintext-exposure", "CKV_SECRET_6"],
];

/// Whether two rule ids belong to a known equivalence family (identical ids
/// count as trivially equivalent).
pub fn same_rule_family(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    RULE_FAMILIES
        .iter()
        .any(|family| family.contains(&a) && family.contains(&b))
}
