//! Finding fingerprints for cross-tool duplicate detection.
//!
//! Two-stage scheme: an exact-match primary key (normalized path plus
//! category) buckets strong merge candidates, then a weighted similarity
//! score over message tokens, rule-equivalence families, and severity
//! proximity decides whether two co-located findings really describe the
//! same issue. Path inequality is a hard gate; scoring only disambiguates
//! within one bucket.

use crate::core::{tables, Category, RawFinding};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Exact-match bucket key. Findings in different buckets are never compared.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimaryKey {
    pub path: String,
    pub category: Category,
}

impl PrimaryKey {
    pub fn of(finding: &RawFinding) -> Self {
        Self {
            path: finding.locator.path.clone(),
            category: finding.category,
        }
    }
}

/// Relative contribution of each similarity signal. Must sum to 1.0 for the
/// score to stay in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub message: f64,
    pub rule_family: f64,
    pub severity: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            message: 0.35,
            rule_family: 0.45,
            severity: 0.20,
        }
    }
}

/// Tunables for the correlation stage. The defaults are policy, not observed
/// behavior, which is why they live in configuration rather than constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Minimum secondary score for two bucket-mates to merge.
    pub threshold: f64,

    /// Maximum line distance between non-overlapping spans that still counts
    /// as the same logical block.
    pub line_window: usize,

    pub weights: SimilarityWeights,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            line_window: 3,
            weights: SimilarityWeights::default(),
        }
    }
}

impl CorrelationConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_line_window(mut self, line_window: usize) -> Self {
        self.line_window = line_window;
        self
    }
}

/// Lowercased word set of a message. `BTreeSet` keeps iteration order fixed,
/// so the overlap computation is identical on every run.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

/// Weighted similarity between two raw findings sharing a primary key.
pub fn similarity(a: &RawFinding, b: &RawFinding, weights: &SimilarityWeights) -> f64 {
    let message_overlap = jaccard(&tokenize(&a.message), &tokenize(&b.message));

    let rule_family = if tables::same_rule_family(&a.rule_id, &b.rule_id) {
        1.0
    } else {
        0.0
    };

    let tier_delta = a.severity.tier().abs_diff(b.severity.tier()) as f64;
    let severity_proximity = 1.0 - tier_delta / 4.0;

    weights.message * message_overlap
        + weights.rule_family * rule_family
        + weights.severity * severity_proximity
}

/// Whether two spans on the same path describe the same logical block:
/// overlapping ranges, or ranges within the configured window. A missing
/// span means the tool located the whole artifact, which is compatible with
/// anything on that path.
pub fn span_compatible(a: &RawFinding, b: &RawFinding, line_window: usize) -> bool {
    match (a.locator.span, b.locator.span) {
        (Some(sa), Some(sb)) => sa.gap(&sb) <= line_window,
        _ => true,
    }
}

/// Full merge gate for two findings already known to share a primary key.
pub fn should_merge(a: &RawFinding, b: &RawFinding, config: &CorrelationConfig) -> bool {
    span_compatible(a, b, config.line_window)
        && similarity(a, b, &config.weights) >= config.threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ResourceLocator, Tool};

    fn ingress_pair() -> (RawFinding, RawFinding) {
        let a = RawFinding::new(
            Tool::Tfsec,
            "open-ingress",
            "HIGH",
            ResourceLocator::new("main.tf").with_line(12),
            "ingress open to the world",
        );
        let b = RawFinding::new(
            Tool::Checkov,
            "firewall-too-permissive",
            "CRITICAL",
            ResourceLocator::new("main.tf").with_span(10, 14),
            "rule permits unrestricted traffic",
        );
        (a, b)
    }

    #[test]
    fn identical_messages_score_full_jaccard() {
        let weights = SimilarityWeights::default();
        let a = RawFinding::new(
            Tool::Tfsec,
            "open-ingress",
            "HIGH",
            ResourceLocator::new("main.tf").with_line(12),
            "security group allows open ingress",
        );
        let b = RawFinding::new(
            Tool::Checkov,
            "CKV_AWS_24",
            "HIGH",
            ResourceLocator::new("main.tf").with_line(12),
            "security group allows open ingress",
        );
        let score = similarity(&a, &b, &weights);
        // message 1.0, family 1.0, severity 1.0
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn score_is_deterministic_across_calls() {
        let weights = SimilarityWeights::default();
        let (a, b) = ingress_pair();
        let first = similarity(&a, &b, &weights);
        for _ in 0..10 {
            assert_eq!(similarity(&a, &b, &weights), first);
        }
        assert_eq!(similarity(&b, &a, &weights), first);
    }

    #[test]
    fn family_match_one_tier_apart_sits_on_the_default_threshold() {
        // No shared message tokens, equivalent rule family, severities one
        // tier apart: 0.45 + 0.20 * 0.75 = 0.60.
        let (a, b) = ingress_pair();
        assert!(should_merge(&a, &b, &CorrelationConfig::default().with_threshold(0.59)));
        assert!(should_merge(&a, &b, &CorrelationConfig::default().with_threshold(0.60)));
        assert!(!should_merge(&a, &b, &CorrelationConfig::default().with_threshold(0.61)));
    }

    #[test]
    fn unrelated_rules_stay_below_threshold() {
        let a = RawFinding::new(
            Tool::Tfsec,
            "aws-s3-enable-bucket-encryption",
            "MEDIUM",
            ResourceLocator::new("s3.tf").with_line(3),
            "bucket is not encrypted at rest",
        );
        let b = RawFinding::new(
            Tool::Checkov,
            "CKV_AWS_21",
            "MEDIUM",
            ResourceLocator::new("s3.tf").with_line(3),
            "bucket versioning is disabled",
        );
        assert!(!should_merge(&a, &b, &CorrelationConfig::default()));
    }

    #[test]
    fn span_window_collapses_differing_granularity() {
        let (a, b) = ingress_pair();
        assert!(span_compatible(&a, &b, 0));

        let far = RawFinding::new(
            Tool::Checkov,
            "CKV_AWS_24",
            "HIGH",
            ResourceLocator::new("main.tf").with_span(40, 44),
            "rule permits unrestricted traffic",
        );
        assert!(!span_compatible(&a, &far, 3));
        assert!(span_compatible(&a, &far, 30));
    }

    #[test]
    fn missing_span_is_compatible_with_any_span() {
        let whole_file = RawFinding::new(
            Tool::Trivy,
            "CVE-2024-0001",
            "HIGH",
            ResourceLocator::new("Cargo.lock"),
            "vulnerable dependency",
        );
        let pinned = RawFinding::new(
            Tool::Trivy,
            "CVE-2024-0001",
            "HIGH",
            ResourceLocator::new("Cargo.lock").with_line(100),
            "vulnerable dependency",
        );
        assert!(span_compatible(&whole_file, &pinned, 0));
    }

    #[test]
    fn tokenize_drops_short_words_and_punctuation() {
        let tokens = tokenize("Port 22 is open to 0.0.0.0/0!");
        assert!(tokens.contains("port"));
        assert!(tokens.contains("open"));
        assert!(!tokens.contains("22"));
        assert!(!tokens.contains("is"));
    }
}
