//! Clustering of raw findings into reconciled findings.
//!
//! Raw findings are bucketed by primary key, clustered inside each bucket
//! with single-link union-find, and each cluster is merged into exactly one
//! reconciled [`Finding`]. Buckets are processed in lexicographic key order
//! and cluster members are canonically sorted before merging, so the output
//! (ids included) is identical however the input files were ordered.

use crate::core::fingerprint::{should_merge, CorrelationConfig, PrimaryKey};
use crate::core::{Finding, RawFinding, ResourceLocator};
use std::collections::{BTreeMap, BTreeSet};

pub struct Correlator {
    config: CorrelationConfig,
}

impl Correlator {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Cluster and merge the full collected raw finding set.
    ///
    /// Requires global visibility: every raw finding for a given locator
    /// must already be present, which is why the pipeline joins all
    /// adapters before calling this.
    pub fn correlate(&self, raw: Vec<RawFinding>) -> Vec<Finding> {
        let mut buckets: BTreeMap<PrimaryKey, Vec<RawFinding>> = BTreeMap::new();
        for finding in raw {
            buckets
                .entry(PrimaryKey::of(&finding))
                .or_default()
                .push(finding);
        }

        let mut findings = Vec::new();
        for (_key, group) in buckets {
            findings.extend(self.cluster_group(group));
        }
        findings
    }

    /// Single-link clustering within one primary-key bucket: a finding joins
    /// a cluster when it passes the merge gate against any member.
    fn cluster_group(&self, group: Vec<RawFinding>) -> Vec<Finding> {
        let mut uf = UnionFind::new(group.len());
        for i in 0..group.len() {
            for j in 0..i {
                if should_merge(&group[j], &group[i], &self.config) {
                    uf.union(j, i);
                }
            }
        }

        let mut clusters: BTreeMap<usize, Vec<RawFinding>> = BTreeMap::new();
        for (index, finding) in group.into_iter().enumerate() {
            clusters.entry(uf.find(index)).or_default().push(finding);
        }

        clusters.into_values().map(merge_cluster).collect()
    }
}

/// Merge one cluster into a reconciled finding.
///
/// Severity is the maximum over constituents (merging never lowers reported
/// risk); the description comes from the highest-severity constituent with
/// ties broken by lexicographically-first tool name, then message; the
/// locator span is the enclosing range; every tool's rule codes are kept.
fn merge_cluster(mut cluster: Vec<RawFinding>) -> Finding {
    debug_assert!(!cluster.is_empty());

    // Canonical member order, independent of input file order.
    cluster.sort_by(|a, b| {
        a.tool
            .as_str()
            .cmp(b.tool.as_str())
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.message.cmp(&b.message))
            .then_with(|| a.locator.span.map(|s| (s.start, s.end)).cmp(
                &b.locator.span.map(|s| (s.start, s.end)),
            ))
    });

    let severity = cluster
        .iter()
        .map(|f| f.severity)
        .max()
        .expect("cluster is non-empty");

    let describing = cluster
        .iter()
        .filter(|f| f.severity == severity)
        .min_by(|a, b| {
            a.tool
                .as_str()
                .cmp(b.tool.as_str())
                .then_with(|| a.message.cmp(&b.message))
        })
        .expect("cluster is non-empty");
    let description = describing.message.clone();

    let span = cluster
        .iter()
        .filter_map(|f| f.locator.span)
        .reduce(|acc, s| acc.enclose(&s));
    let locator = ResourceLocator {
        path: cluster[0].locator.path.clone(),
        span,
    };

    let category = cluster[0].category;

    let mut source_tools = BTreeSet::new();
    let mut rule_ids: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut rule_pairs = BTreeSet::new();
    for finding in &cluster {
        let tool = finding.tool.as_str().to_string();
        source_tools.insert(tool.clone());
        let rules = rule_ids.entry(tool).or_default();
        if !rules.contains(&finding.rule_id) {
            rules.push(finding.rule_id.clone());
        }
        rule_pairs.insert(format!("{}:{}", finding.tool, finding.rule_id));
    }
    for rules in rule_ids.values_mut() {
        rules.sort();
    }

    let id = Finding::derive_id(&locator, category, &rule_pairs);

    Finding {
        id,
        source_tools,
        rule_ids,
        locator,
        category,
        severity,
        description,
        raw_refs: cluster,
    }
}

/// Minimal union-find with the smaller root always winning, so each
/// cluster's representative is its lowest member index.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[high] = low;
    }
}
