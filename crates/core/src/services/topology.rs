//! API Gateway topology walk.
//!
//! The walk flattens every REST API -> resource -> method integration into a
//! list of [`IntegrationRecord`]s. Failures are contained at the smallest
//! scope: a broken API listing yields an empty topology, a broken resource
//! listing skips that API, and a method without an integration is skipped.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuditError;
use crate::model::{ApiDescriptor, IntegrationMatch, IntegrationRecord, ResourceNode};
use crate::services::pagination::paginate;
use crate::services::provider::{CloudProvider, ListQuery, ProviderError};

/// Resource trees are bounded, so one large page usually covers an API.
pub const DEFAULT_RESOURCE_PAGE_LIMIT: u32 = 500;

/// Page limits used while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    pub api_page_limit: Option<u32>,
    pub resource_page_limit: Option<u32>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { api_page_limit: None, resource_page_limit: Some(DEFAULT_RESOURCE_PAGE_LIMIT) }
    }
}

/// How often the topology is walked during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyMode {
    /// Walk once and share the result with every inspection.
    #[default]
    Shared,
    /// Walk again for every found function. Costs O(functions x APIs)
    /// provider calls; only useful to reproduce legacy call counts.
    PerFunction,
}

/// One integration together with the name of the API that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyEntry {
    pub api_name: String,
    pub record: IntegrationRecord,
}

/// Result of one topology walk. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub apis: Vec<ApiDescriptor>,
    pub entries: Vec<TopologyEntry>,
    /// Degraded subtrees, as human-readable messages.
    pub warnings: Vec<String>,
}

impl Topology {
    /// Integrations whose target URI contains `identifier`, in walk order.
    pub fn matches_for(&self, identifier: &str) -> Vec<IntegrationMatch> {
        if identifier.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.record.target_uri.contains(identifier))
            .map(|entry| IntegrationMatch::new(&entry.api_name, &entry.record))
            .collect()
    }

    pub fn integration_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResource {
    id: String,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    resource_methods: Option<BTreeMap<String, Value>>,
}

impl From<RawResource> for ResourceNode {
    fn from(raw: RawResource) -> Self {
        Self {
            id: raw.id,
            path: raw.path,
            methods: raw.resource_methods.unwrap_or_default().into_keys().collect(),
        }
    }
}

/// Walks the API Gateway topology through a provider.
pub struct TopologyWalker<'a> {
    provider: &'a dyn CloudProvider,
    options: WalkOptions,
}

impl<'a> TopologyWalker<'a> {
    pub fn new(provider: &'a dyn CloudProvider, options: WalkOptions) -> Self {
        Self { provider, options }
    }

    pub fn list_apis(&self) -> Result<Vec<ApiDescriptor>, ProviderError> {
        paginate(self.provider, ListQuery::Apis, self.options.api_page_limit).collect_typed()
    }

    pub fn list_resources(&self, api_id: &str) -> Result<Vec<ResourceNode>, ProviderError> {
        let query = ListQuery::Resources { api_id: api_id.to_string() };
        let raw: Vec<RawResource> =
            paginate(self.provider, query, self.options.resource_page_limit).collect_typed()?;
        Ok(raw.into_iter().map(ResourceNode::from).collect())
    }

    /// Walk every API, resource and method. Never fails; see [`Topology::warnings`].
    pub fn walk(&self) -> Topology {
        let mut topology = Topology::default();

        let apis = match self.list_apis() {
            Ok(apis) => apis,
            Err(source) => {
                let err = AuditError::TopologyEnumerationFailed {
                    scope: ListQuery::Apis.label(),
                    source,
                };
                tracing::warn!("{err}");
                topology.warnings.push(err.to_string());
                return topology;
            }
        };

        for api in &apis {
            let resources = match self.list_resources(&api.id) {
                Ok(resources) => resources,
                Err(source) => {
                    let err = AuditError::TopologyEnumerationFailed {
                        scope: ListQuery::Resources { api_id: api.id.clone() }.label(),
                        source,
                    };
                    tracing::warn!("{err}");
                    topology.warnings.push(err.to_string());
                    continue;
                }
            };

            for resource in &resources {
                for method in &resource.methods {
                    match self.provider.get_integration(&api.id, &resource.id, method) {
                        Ok(Some(uri)) if !uri.is_empty() => topology.entries.push(TopologyEntry {
                            api_name: api.name.clone(),
                            record: IntegrationRecord {
                                api_id: api.id.clone(),
                                resource_id: resource.id.clone(),
                                http_method: method.clone(),
                                target_uri: uri,
                            },
                        }),
                        Ok(_) => {}
                        Err(ProviderError::NotConfigured(_)) => {
                            let err = AuditError::IntegrationNotConfigured {
                                api_id: api.id.clone(),
                                resource_id: resource.id.clone(),
                                http_method: method.clone(),
                            };
                            tracing::debug!("{err}");
                        }
                        Err(err) => {
                            tracing::debug!(
                                api = %api.id,
                                resource = %resource.id,
                                method = %method,
                                "skipping method: {err}"
                            );
                        }
                    }
                }
            }
        }

        topology.apis = apis;
        tracing::info!(
            apis = topology.apis.len(),
            integrations = topology.integration_count(),
            "walked API topology"
        );
        topology
    }
}

/// Hands out the topology to inspections according to a [`TopologyMode`].
///
/// In shared mode the first caller walks and every other caller (including
/// concurrent ones) waits for and reuses that walk.
pub struct TopologySource<'a> {
    walker: TopologyWalker<'a>,
    mode: TopologyMode,
    shared: OnceLock<Arc<Topology>>,
    walks: AtomicUsize,
    warnings: Mutex<Vec<String>>,
}

impl<'a> TopologySource<'a> {
    pub fn new(walker: TopologyWalker<'a>, mode: TopologyMode) -> Self {
        Self {
            walker,
            mode,
            shared: OnceLock::new(),
            walks: AtomicUsize::new(0),
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Arc<Topology> {
        match self.mode {
            TopologyMode::Shared => {
                Arc::clone(self.shared.get_or_init(|| Arc::new(self.walk_and_record())))
            }
            TopologyMode::PerFunction => Arc::new(self.walk_and_record()),
        }
    }

    /// Number of full walks performed so far.
    pub fn walk_count(&self) -> usize {
        self.walks.load(Ordering::SeqCst)
    }

    /// Distinct warnings collected across all walks, in first-seen order.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn walk_and_record(&self) -> Topology {
        self.walks.fetch_add(1, Ordering::SeqCst);
        let topology = self.walker.walk();
        let mut seen = self.warnings.lock().unwrap_or_else(PoisonError::into_inner);
        for warning in &topology.warnings {
            if !seen.contains(warning) {
                seen.push(warning.clone());
            }
        }
        topology
    }
}
