//! Audit configuration and on-disk layout.
//!
//! `AuditConfig` can be loaded from a JSON or YAML file; every field has a
//! default so an empty file (or no file at all) is a valid configuration.
//! Frontends apply their own overrides on top.

mod layout;

pub use layout::ReportLayout;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::services::audit::AuditOptions;
use crate::services::inspector::default_ownership_keys;
use crate::services::topology::{TopologyMode, WalkOptions};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Which provider adapter serves the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Shell out to the `aws` command line tool.
    #[default]
    AwsCli,
    /// Serve an exported account snapshot file.
    Snapshot,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsCli => "aws-cli",
            Self::Snapshot => "snapshot",
        }
    }
}

/// Serializable configuration for one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub region: String,
    pub provider: ProviderKind,
    /// Snapshot file, required when `provider` is `snapshot`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
    /// Explicit `aws` binary. Falls back to `AWS_CLI_BIN`, then `aws` on PATH.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_cli_bin: Option<PathBuf>,
    /// Named AWS CLI profile passed as `--profile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_profile: Option<String>,
    pub ownership_keys: Vec<String>,
    pub topology_mode: TopologyMode,
    pub walk: WalkOptions,
    pub jobs: usize,
    /// Markdown report location; defaults to the layout's report path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            provider: ProviderKind::default(),
            snapshot: None,
            aws_cli_bin: None,
            aws_profile: None,
            ownership_keys: default_ownership_keys(),
            topology_mode: TopologyMode::default(),
            walk: WalkOptions::default(),
            jobs: 1,
            output: None,
        }
    }
}

impl AuditConfig {
    /// Load a config file. YAML is a superset of JSON, so both parse here.
    pub fn load(path: &Path) -> AuditResult<Self> {
        let body = fs::read_to_string(path).map_err(|e| {
            AuditError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&body).map_err(|e| {
            AuditError::Config(format!("failed to parse config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot produce a run.
    pub fn validate(&self) -> AuditResult<()> {
        if self.region.trim().is_empty() {
            return Err(AuditError::Config("region must not be empty".into()));
        }
        if self.provider == ProviderKind::Snapshot && self.snapshot.is_none() {
            return Err(AuditError::Config("provider `snapshot` requires a snapshot path".into()));
        }
        if self.ownership_keys.iter().any(|key| key.is_empty()) {
            return Err(AuditError::Config("ownership keys must not be empty".into()));
        }
        Ok(())
    }

    pub fn audit_options(&self) -> AuditOptions {
        AuditOptions {
            ownership_keys: self.ownership_keys.clone(),
            topology_mode: self.topology_mode,
            walk: self.walk,
            jobs: self.jobs,
        }
    }
}
