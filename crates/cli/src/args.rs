use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lambda_audit_core::config::{AuditConfig, ProviderKind};
use lambda_audit_core::services::topology::TopologyMode;

/// Audit Lambda functions: existence, ownership tags and API Gateway routes.
///
/// This CLI is a thin wrapper around `lambda-audit-core` (exposed in code as
/// `lambda_audit_core`). It reads one function name per line, inspects each
/// one read-only and writes a Markdown report under `inventory/`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lambda-audit",
    version,
    about = "Audit Lambda functions and the API Gateway routes that invoke them",
    long_about = None
)]
pub struct Cli {
    /// File with one function name per line. Blank lines and `#` comments are ignored.
    #[arg(short = 'f', long)]
    pub functions_file: PathBuf,

    /// Region to audit. Defaults to the config file value, then us-east-1.
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// Optional JSON or YAML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where account data comes from.
    #[arg(long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Account snapshot file (implies `--provider snapshot` when no provider is given).
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Named AWS CLI profile.
    #[arg(long)]
    pub profile: Option<String>,

    /// Inspect up to N functions concurrently. Report order is unchanged.
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Walk the API topology again for every found function instead of once per run.
    #[arg(long, default_value_t = false)]
    pub rewalk_topology: bool,

    /// Also write a JSON run summary next to the report.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Markdown report path. Defaults to inventory/function_integration_report.md.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Directory the inventory/ output is placed under. Defaults to the current directory.
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderArg {
    AwsCli,
    Snapshot,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::AwsCli => ProviderKind::AwsCli,
            ProviderArg::Snapshot => ProviderKind::Snapshot,
        }
    }
}

impl Cli {
    /// Layer command-line flags over a loaded (or default) config.
    pub fn apply_overrides(&self, config: &mut AuditConfig) {
        if let Some(region) = &self.region {
            config.region = region.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot = Some(snapshot.clone());
            if self.provider.is_none() {
                config.provider = ProviderKind::Snapshot;
            }
        }
        if let Some(provider) = self.provider {
            config.provider = provider.into();
        }
        if let Some(profile) = &self.profile {
            config.aws_profile = Some(profile.clone());
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.rewalk_topology {
            config.topology_mode = TopologyMode::PerFunction;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
    }
}
