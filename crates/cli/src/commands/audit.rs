use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use lambda_audit_core::config::{AuditConfig, ReportLayout};
use lambda_audit_core::input::read_function_names;
use lambda_audit_core::model::FunctionRecord;
use lambda_audit_core::report::{render_report, AuditSummary};
use lambda_audit_core::services::providers::build_provider;
use lambda_audit_core::services::AuditRunner;
use serde::Serialize;

use crate::args::Cli;
use crate::{canonicalize_or_current, sha256_file};

/// Machine-readable companion to the Markdown report.
#[derive(Serialize)]
pub struct RunSummary<'a> {
    pub generated_at: String,
    pub tool_version: &'static str,
    pub region: &'a str,
    pub provider: &'static str,
    pub functions_file: String,
    pub functions_sha256: String,
    pub summary: AuditSummary,
    pub topology_walks: usize,
    pub topology_warnings: &'a [String],
    pub records: &'a [FunctionRecord],
}

/// Where a finished run left its artifacts.
#[derive(Debug, Clone)]
pub struct AuditArtifacts {
    pub report_path: PathBuf,
    pub summary_path: Option<PathBuf>,
    pub summary: AuditSummary,
}

/// Run one audit as described by the command line and write the report.
pub fn audit_command(cli: &Cli) -> Result<AuditArtifacts> {
    // Missing input must fail before any provider is built or file is written.
    let names = read_function_names(&cli.functions_file)?;

    let mut config = match &cli.config {
        Some(path) => AuditConfig::load(path)?,
        None => AuditConfig::default(),
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    let root = canonicalize_or_current(&cli.root)?;
    let layout = ReportLayout::new(&root);

    let provider = build_provider(&config)?;
    tracing::info!(
        provider = provider.name(),
        region = %config.region,
        functions = names.len(),
        "starting audit"
    );
    let options = config.audit_options();
    let outcome = AuditRunner { provider: provider.as_ref(), options: &options }.run(&names);

    let report = render_report(&config.region, &outcome.records);
    let report_path = resolve_report_path(&layout, config.output.as_deref());
    write_file(&report_path, &report)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    let summary = AuditSummary::from_records(&outcome.records);

    let summary_path = if cli.json {
        let path = match &config.output {
            Some(_) => summary_path_for(&report_path),
            None => layout.summary_path.clone(),
        };
        let run = RunSummary {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool_version: env!("CARGO_PKG_VERSION"),
            region: &config.region,
            provider: provider.name(),
            functions_file: cli.functions_file.display().to_string(),
            functions_sha256: sha256_file(&cli.functions_file)?,
            summary,
            topology_walks: outcome.topology_walks,
            topology_warnings: &outcome.topology_warnings,
            records: &outcome.records,
        };
        let json = serde_json::to_string_pretty(&run)?;
        write_file(&path, &json)
            .with_context(|| format!("Failed to write run summary: {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    println!(
        "Inspected {} functions: {} found, {} not found, {} integrated, {} owned",
        summary.inspected, summary.found, summary.not_found, summary.integrated, summary.owned
    );
    for warning in &outcome.topology_warnings {
        println!("  Warning: {warning}");
    }
    if let Some(path) = &summary_path {
        println!("Summary written to {}", display_path(&layout, path));
    }
    println!("Report written to {}", display_path(&layout, &report_path));

    Ok(AuditArtifacts { report_path, summary_path, summary })
}

/// The `--output` override, anchored at the layout root when relative.
pub fn resolve_report_path(layout: &ReportLayout, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => layout.root.join(path),
        None => layout.report_path.clone(),
    }
}

/// Summary path beside an overridden report: `<stem>.summary.json`. Never the
/// report path itself, whatever extension the report was given.
pub fn summary_path_for(report_path: &Path) -> PathBuf {
    let stem = report_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "function_integration_report".to_string());
    report_path.with_file_name(format!("{stem}.summary.json"))
}

fn display_path(layout: &ReportLayout, path: &Path) -> String {
    if path == layout.report_path {
        return layout.report_path_relative_string();
    }
    match path.strip_prefix(&layout.root) {
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents)?;
    Ok(())
}
