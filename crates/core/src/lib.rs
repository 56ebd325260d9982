//! lambda-audit-core
//!
//! Core library for auditing Lambda functions in one account/region.
//!
//! For every requested function name this crate determines whether the
//! function exists, which stack or app owns it (from resource tags), and which
//! API Gateway methods integrate with it. Provider access goes through the
//! [`services::provider::CloudProvider`] trait so the correlation logic can be
//! exercised without a cloud account.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the CLI crate only parses flags and writes files.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod report;
pub mod services;

pub use error::AuditError;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
