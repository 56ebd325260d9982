//! Audit-level error kinds.
//!
//! Provider calls fail with [`ProviderError`]; the audit layer wraps those
//! into the kinds below so the report and the CLI can tell a missing function
//! from a degraded tag lookup or a broken topology walk.

use std::path::PathBuf;

use thiserror::Error;

use crate::services::provider::ProviderError;

/// Errors surfaced by the audit pipeline.
///
/// Only [`AuditError::InputFileMissing`], [`AuditError::InputRead`] and
/// [`AuditError::Config`] stop a run; the other variants end up as text in a
/// function's report section.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Function identity lookup failed with not-found or access-denied.
    #[error("{name}: {source}")]
    NotFoundOrDenied {
        name: String,
        #[source]
        source: ProviderError,
    },

    /// Tag lookup failed; the record degrades to empty tags.
    #[error("Tag lookup failed for {identifier}: {source}")]
    TagLookupFailed {
        identifier: String,
        #[source]
        source: ProviderError,
    },

    /// Listing APIs or one API's resources failed.
    #[error("Topology enumeration failed for {scope}: {source}")]
    TopologyEnumerationFailed {
        scope: String,
        #[source]
        source: ProviderError,
    },

    /// A resource method has no integration configured.
    #[error("No integration configured for {api_id}/{resource_id} {http_method}")]
    IntegrationNotConfigured { api_id: String, resource_id: String, http_method: String },

    /// Any other provider failure that escaped the inspector.
    #[error("Inspection of {name} failed: {source}")]
    Inspection {
        name: String,
        #[source]
        source: ProviderError,
    },

    /// The function list file does not exist.
    #[error("functions file not found: {0}")]
    InputFileMissing(PathBuf),

    /// The function list file exists but could not be read.
    #[error("Failed to read functions file {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
