//! Audit services.
//!
//! - `provider`: the `CloudProvider` capability trait and its error type.
//! - `providers`: adapters (AWS CLI, account snapshot).
//! - `pagination`: cursor-following enumeration over list queries.
//! - `topology`: API Gateway walk and per-run topology sharing.
//! - `inspector`: per-function identity, tags, ownership and integrations.
//! - `audit`: the orchestrator that runs the inspector over a name list.

pub mod audit;
pub mod inspector;
pub mod pagination;
pub mod provider;
pub mod providers;
pub mod topology;

pub use audit::{AuditOptions, AuditOutcome, AuditRunner};
pub use provider::{CloudProvider, ProviderError};
