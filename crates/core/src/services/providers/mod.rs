#[cfg(feature = "aws-cli-provider")]
pub mod aws_cli;
pub mod snapshot;

#[cfg(feature = "aws-cli-provider")]
pub use aws_cli::AwsCliProvider;
pub use snapshot::{AccountSnapshot, SnapshotProvider};

use crate::config::{AuditConfig, ProviderKind};
use crate::error::{AuditError, AuditResult};
use crate::services::provider::CloudProvider;

/// Construct the provider selected by `config`.
///
/// Called once per run; the returned provider is passed down explicitly to
/// every component that queries the account.
pub fn build_provider(config: &AuditConfig) -> AuditResult<Box<dyn CloudProvider>> {
    match config.provider {
        ProviderKind::Snapshot => {
            let path = config.snapshot.as_ref().ok_or_else(|| {
                AuditError::Config("provider `snapshot` requires a snapshot path".into())
            })?;
            let snapshot = AccountSnapshot::load(path).map_err(|e| {
                AuditError::Config(format!("cannot use snapshot {}: {e}", path.display()))
            })?;
            if let Some(region) = snapshot.region.as_deref() {
                if region != config.region {
                    tracing::warn!(
                        snapshot_region = region,
                        region = %config.region,
                        "snapshot was exported from a different region"
                    );
                }
            }
            Ok(Box::new(SnapshotProvider::new(snapshot)))
        }
        #[cfg(feature = "aws-cli-provider")]
        ProviderKind::AwsCli => {
            let mut provider = AwsCliProvider::new(config.region.clone())
                .with_profile(config.aws_profile.clone());
            if let Some(bin) = &config.aws_cli_bin {
                provider = provider.with_bin(bin.clone());
            }
            Ok(Box::new(provider))
        }
        #[cfg(not(feature = "aws-cli-provider"))]
        ProviderKind::AwsCli => {
            Err(AuditError::Config("this build does not include the aws-cli provider".into()))
        }
    }
}
