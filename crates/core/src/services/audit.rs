use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::FunctionRecord;
use crate::services::inspector::{default_ownership_keys, FunctionInspector};
use crate::services::provider::CloudProvider;
use crate::services::topology::{TopologyMode, TopologySource, TopologyWalker, WalkOptions};

/// Knobs for one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOptions {
    pub ownership_keys: Vec<String>,
    pub topology_mode: TopologyMode,
    pub walk: WalkOptions,
    /// Number of concurrent inspections. `0` and `1` both mean sequential.
    pub jobs: usize,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            ownership_keys: default_ownership_keys(),
            topology_mode: TopologyMode::Shared,
            walk: WalkOptions::default(),
            jobs: 1,
        }
    }
}

/// Everything produced by one run, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOutcome {
    pub records: Vec<FunctionRecord>,
    pub topology_walks: usize,
    pub topology_warnings: Vec<String>,
}

/// Coordinator that inspects every requested function against one provider.
pub struct AuditRunner<'a> {
    pub provider: &'a dyn CloudProvider,
    pub options: &'a AuditOptions,
}

impl<'a> AuditRunner<'a> {
    /// Inspect `names` in order. Duplicates are inspected independently and
    /// every name yields exactly one record, whatever fails.
    pub fn run(&self, names: &[String]) -> AuditOutcome {
        let source = TopologySource::new(
            TopologyWalker::new(self.provider, self.options.walk),
            self.options.topology_mode,
        );
        let inspector = FunctionInspector {
            provider: self.provider,
            topology: &source,
            ownership_keys: &self.options.ownership_keys,
        };

        let records = if self.options.jobs > 1 && names.len() > 1 {
            inspect_parallel(&inspector, names, self.options.jobs)
        } else {
            names.iter().map(|name| inspect_one(&inspector, name)).collect()
        };

        AuditOutcome {
            records,
            topology_walks: source.walk_count(),
            topology_warnings: source.warnings(),
        }
    }
}

fn inspect_one(inspector: &FunctionInspector<'_>, name: &str) -> FunctionRecord {
    tracing::info!(function = name, "inspecting");
    inspector.inspect(name).unwrap_or_else(|err| {
        tracing::warn!("{err}");
        FunctionRecord::not_found(name, err.to_string())
    })
}

/// Inspect on a pool of `jobs` threads. The indexed collect keeps input order
/// regardless of completion order.
fn inspect_parallel(
    inspector: &FunctionInspector<'_>,
    names: &[String],
    jobs: usize,
) -> Vec<FunctionRecord> {
    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| {
            names.par_iter().map(|name| inspect_one(inspector, name)).collect()
        }),
        Err(err) => {
            tracing::warn!(jobs, "thread pool unavailable, inspecting sequentially: {err}");
            names.iter().map(|name| inspect_one(inspector, name)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FunctionIdentity;
    use crate::services::provider::{PageRequest, ProviderError};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    /// Functions named `fn-<even>` exist; odd ones are missing.
    struct EvenOnly;

    impl CloudProvider for EvenOnly {
        fn name(&self) -> &'static str {
            "even-only"
        }

        fn get_function(&self, name: &str) -> Result<FunctionIdentity, ProviderError> {
            let n: u32 = name.trim_start_matches("fn-").parse().unwrap_or(1);
            if n % 2 == 0 {
                Ok(FunctionIdentity { name: name.into(), arn: Some(format!("arn:{name}")) })
            } else {
                Err(ProviderError::NotFound(name.into()))
            }
        }

        fn list_tags(&self, _identifier: &str) -> Result<BTreeMap<String, String>, ProviderError> {
            Ok(BTreeMap::new())
        }

        fn list_page(&self, _request: &PageRequest<'_>) -> Result<Value, ProviderError> {
            Ok(json!({"items": []}))
        }

        fn get_integration(
            &self,
            _api_id: &str,
            _resource_id: &str,
            _http_method: &str,
        ) -> Result<Option<String>, ProviderError> {
            Ok(None)
        }
    }

    #[test]
    fn pooled_run_matches_sequential_order() {
        let names: Vec<String> = (0..64).map(|i| format!("fn-{i}")).collect();
        let pooled = AuditOptions { jobs: 8, ..Default::default() };
        let outcome = AuditRunner { provider: &EvenOnly, options: &pooled }.run(&names);

        let got: Vec<&str> = outcome.records.iter().map(|r| r.name.as_str()).collect();
        let want: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(got, want);
        assert!(outcome.records.iter().enumerate().all(|(i, r)| r.found == (i % 2 == 0)));
        assert_eq!(outcome.topology_walks, 1);

        let sequential = AuditOptions::default();
        let baseline = AuditRunner { provider: &EvenOnly, options: &sequential }.run(&names);
        assert_eq!(outcome.records, baseline.records);
    }
}
