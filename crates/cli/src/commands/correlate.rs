//! Report correlation command.
//!
//! Collects input reports from explicit `tool=path` pairs and/or a
//! directory sweep, runs the engine pipeline, and renders the unified
//! report in the requested format. Per-file problems (malformed reports,
//! unrecognized tools) never abort the run; they surface in the report's
//! parse-failure list so the operator can tell a clean scan from a scanner
//! that did not run.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use crosscheck_engine::{
    AdapterRegistry, CorrelateError, CorrelationConfig, Pipeline, Report, ReportInput, Severity,
    VERSION,
};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Clone)]
pub struct CorrelateArgs {
    /// Report to ingest, as tool=path (repeatable)
    #[arg(short, long = "report", value_name = "TOOL=PATH")]
    pub reports: Vec<String>,

    /// Directory of reports; each file's tool is inferred from its
    /// file-stem prefix (tfsec-prod.json -> tfsec)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Minimum similarity score for two co-located findings to merge
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Line distance between spans still treated as the same logical block
    #[arg(long)]
    pub line_window: Option<usize>,

    /// Attach generation metadata (timestamp, engine version) to the report
    #[arg(long)]
    pub stamp: bool,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Json,
    Markdown,
    Console,
}

pub fn execute(args: CorrelateArgs) -> Result<()> {
    let mut inputs = Vec::new();
    for spec in &args.reports {
        inputs.push(parse_report_spec(spec)?);
    }
    if let Some(dir) = &args.dir {
        inputs.extend(discover_reports(dir)?);
    }

    if inputs.is_empty() {
        if let Some(dir) = &args.dir {
            return Err(CorrelateError::EmptyInput)
                .with_context(|| format!("no report files found under {}", dir.display()));
        }
        bail!("no reports given; pass --report tool=path or --dir DIR");
    }

    let mut config = CorrelationConfig::default();
    if let Some(threshold) = args.threshold {
        config = config.with_threshold(threshold);
    }
    if let Some(window) = args.line_window {
        config = config.with_line_window(window);
    }

    let pipeline = Pipeline::new(AdapterRegistry::builtin()).with_config(config);
    let mut report = pipeline.run(&inputs)?;

    if args.stamp {
        report = report.with_metadata(chrono::Utc::now(), VERSION.to_string());
    }

    let rendered = match args.format {
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Markdown => report.to_markdown(),
        OutputFormat::Console => render_console(&report, args.verbose),
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if args.verbose {
                eprintln!("report written to {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn parse_report_spec(spec: &str) -> Result<ReportInput> {
    match spec.split_once('=') {
        Some((tool, path)) if !tool.is_empty() && !path.is_empty() => {
            Ok(ReportInput::new(tool, path))
        }
        _ => bail!("invalid report spec `{spec}`; expected tool=path"),
    }
}

/// Walk a directory of report files. The claimed tool is whatever precedes
/// the first `-` (or the whole stem); files with an unrecognized prefix are
/// still submitted and come back as recorded unsupported-tool failures.
fn discover_reports(dir: &Path) -> Result<Vec<ReportInput>> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let tool = stem.split('-').next().unwrap_or(stem);
        inputs.push(ReportInput::new(tool, path.to_path_buf()));
    }

    // Walk order varies by platform; keep failure listings reproducible.
    inputs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(inputs)
}

fn render_console(report: &Report, verbose: bool) -> String {
    let mut out = String::new();

    let summary = &report.summary;
    out.push_str(&format!(
        "{} {} finding(s)\n",
        "Correlated:".bold(),
        summary.total_findings
    ));
    out.push_str(&format!(
        "  {} critical, {} high, {} medium, {} low, {} info\n",
        summary.by_severity.critical,
        summary.by_severity.high,
        summary.by_severity.medium,
        summary.by_severity.low,
        summary.by_severity.info
    ));

    if report.findings.is_empty() {
        out.push_str(&format!("{}\n", "No findings to report".green()));
    }

    for (i, finding) in report.findings.iter().enumerate() {
        out.push_str(&format!(
            "\n{}. {} {} [{}]\n",
            i + 1,
            severity_label(finding.severity),
            finding.description,
            finding.category
        ));
        out.push_str(&format!("   at {}\n", finding.locator));
        out.push_str(&format!(
            "   reported by {}\n",
            finding
                .source_tools
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        ));
        if verbose {
            for (tool, rules) in &finding.rule_ids {
                out.push_str(&format!("   {} rules: {}\n", tool, rules.join(", ")));
            }
            out.push_str(&format!("   id: {}\n", finding.id));
        }
    }

    if !summary.parse_failures.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            format!("{} report(s) could not be ingested:", summary.parse_failures.len())
                .yellow()
                .bold()
        ));
        for failure in &summary.parse_failures {
            out.push_str(&format!(
                "  - {} ({}): {}\n",
                failure.file, failure.tool, failure.error
            ));
        }
    }

    out
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRITICAL".red().bold(),
        Severity::High => "HIGH".bright_red(),
        Severity::Medium => "MEDIUM".yellow(),
        Severity::Low => "LOW".bright_yellow(),
        Severity::Info => "INFO".blue(),
    }
}
