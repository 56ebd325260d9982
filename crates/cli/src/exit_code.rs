//! Process exit codes.
//!
//! A run that produced a report always exits 0, however many functions were
//! missing or degraded. Non-zero codes are reserved for runs that could not
//! start.

use lambda_audit_core::AuditError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Unhandled failure, e.g. the report could not be written.
    GeneralError = 1,

    /// The functions file does not exist. No report is written.
    InputFileMissing = 2,

    /// The config file, snapshot or provider selection is unusable.
    ConfigError = 3,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&AuditError> for ExitCode {
    fn from(err: &AuditError) -> Self {
        match err {
            AuditError::InputFileMissing(_) => ExitCode::InputFileMissing,
            AuditError::Config(_) => ExitCode::ConfigError,
            _ => ExitCode::GeneralError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

/// Extract the exit code for an error surfaced through `anyhow`.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        self.chain()
            .find_map(|cause| cause.downcast_ref::<AuditError>())
            .map(ExitCode::from)
            .unwrap_or(ExitCode::GeneralError)
    }
}
