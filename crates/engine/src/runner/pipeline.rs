//! End-to-end pipeline: parse every input report, join, correlate, report.
//!
//! Adapter parsing is independent per report file and fans out on the rayon
//! pool; the collected results are the synchronization point, and the
//! correlation stage only starts once every adapter has completed or
//! definitively failed, since clustering needs global visibility into all
//! findings for a locator. Per-file failures are collected, never thrown
//! past the adapter boundary. Nothing is persisted until the caller renders
//! the returned report.

use crate::core::fingerprint::CorrelationConfig;
use crate::core::{CorrelateError, Correlator, ParseFailure, RawFinding, Report, Tool};
use crate::runner::AdapterRegistry;
use rayon::prelude::*;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// One report file to ingest, tagged with the tool name the caller claims
/// produced it. The name is resolved against the registry at run time so an
/// unrecognized tool degrades into a recorded failure instead of a panic.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub tool: String,
    pub path: PathBuf,
}

impl ReportInput {
    pub fn new(tool: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            path: path.into(),
        }
    }
}

pub struct Pipeline {
    registry: AdapterRegistry,
    config: CorrelationConfig,
}

impl Pipeline {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            config: CorrelationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CorrelationConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline over a set of input reports.
    ///
    /// An explicitly-empty input set yields an empty report. When inputs
    /// were supplied but none could be parsed, the run fails with
    /// [`CorrelateError::NoUsableInput`]; any smaller number of per-file
    /// failures is recorded in the report's summary instead.
    pub fn run(&self, inputs: &[ReportInput]) -> anyhow::Result<Report> {
        if inputs.is_empty() {
            return Ok(Report::new(Vec::new(), Vec::new()));
        }

        let outcomes: Vec<Result<Vec<RawFinding>, CorrelateError>> = inputs
            .par_iter()
            .map(|input| self.parse_one(input))
            .collect();

        let mut raw = Vec::new();
        let mut failures = Vec::new();
        let mut parsed = 0usize;
        for (input, outcome) in inputs.iter().zip(outcomes) {
            match outcome {
                Ok(findings) => {
                    debug!(
                        tool = %input.tool,
                        file = %input.path.display(),
                        count = findings.len(),
                        "ingested report"
                    );
                    parsed += 1;
                    raw.extend(findings);
                }
                Err(error) => {
                    warn!(
                        tool = %input.tool,
                        file = %input.path.display(),
                        %error,
                        "skipping report"
                    );
                    failures.push(ParseFailure {
                        tool: input.tool.clone(),
                        file: input.path.display().to_string(),
                        error: error.to_string(),
                    });
                }
            }
        }

        if parsed == 0 {
            return Err(CorrelateError::NoUsableInput {
                supplied: inputs.len(),
            }
            .into());
        }

        let findings = Correlator::new(self.config.clone()).correlate(raw);
        Ok(Report::new(findings, failures))
    }

    fn parse_one(&self, input: &ReportInput) -> Result<Vec<RawFinding>, CorrelateError> {
        let tool = Tool::from_str(&input.tool)?;
        let adapter = self
            .registry
            .get(tool)
            .ok_or_else(|| CorrelateError::UnsupportedTool(input.tool.clone()))?;
        let bytes = std::fs::read(&input.path).map_err(|e| CorrelateError::Read {
            file: input.path.display().to_string(),
            reason: e.to_string(),
        })?;
        adapter.parse(&bytes)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AdapterRegistry::builtin())
    }
}
