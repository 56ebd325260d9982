//! Provider backed by an exported account snapshot.
//!
//! The snapshot is a YAML (or JSON) document describing functions and REST
//! APIs. List queries are served in pages of `page_size` with a numeric
//! `position` cursor, so the same enumeration path runs as against the real
//! service. Error fields let a snapshot describe denied functions and broken
//! listings.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::FunctionIdentity;
use crate::services::provider::{CloudProvider, ListQuery, PageRequest, ProviderError};

pub const DEFAULT_SNAPSHOT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub functions: Vec<SnapshotFunction>,
    #[serde(default)]
    pub apis: Vec<SnapshotApi>,
    /// When set, listing APIs fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apis_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFunction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// When set, tag lookups fail with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_error: Option<String>,
    /// The function exists but the caller may not read it.
    #[serde(default)]
    pub denied: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotApi {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: Vec<SnapshotResource>,
    /// When set, listing this API's resources fails with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotResource {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// HTTP method -> integration. A method mapped to `{}` has no integration.
    #[serde(default)]
    pub methods: BTreeMap<String, SnapshotMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMethod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl AccountSnapshot {
    pub fn parse(body: &str) -> Result<Self, ProviderError> {
        serde_yaml::from_str(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse snapshot: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let body = fs::read_to_string(path).map_err(|e| {
            ProviderError::Backend(format!("failed to read snapshot {}: {e}", path.display()))
        })?;
        Self::parse(&body)
    }
}

/// [`CloudProvider`] serving an [`AccountSnapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: AccountSnapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: AccountSnapshot) -> Self {
        Self { snapshot }
    }

    fn page_size(&self, limit: Option<u32>) -> usize {
        let configured = self.snapshot.page_size.unwrap_or(DEFAULT_SNAPSHOT_PAGE_SIZE).max(1);
        match limit {
            Some(limit) if limit > 0 => configured.min(limit as usize),
            _ => configured,
        }
    }

    fn api(&self, api_id: &str) -> Result<&SnapshotApi, ProviderError> {
        self.snapshot
            .apis
            .iter()
            .find(|api| api.id == api_id)
            .ok_or_else(|| {
                ProviderError::NotFound(format!("Invalid API identifier specified: {api_id}"))
            })
    }
}

/// Slice `items` into the page starting at `cursor`, adding a `position`
/// cursor when more items remain.
fn page_of(
    items: Vec<Value>,
    cursor: Option<&str>,
    page_size: usize,
) -> Result<Value, ProviderError> {
    let start = match cursor {
        Some(token) => token
            .parse::<usize>()
            .map_err(|_| ProviderError::Backend(format!("invalid pagination token: {token}")))?,
        None => 0,
    };
    let end = (start + page_size).min(items.len());
    let page: Vec<Value> = items.get(start..end).map(<[Value]>::to_vec).unwrap_or_default();
    let mut body = json!({ "items": page });
    if end < items.len() {
        body["position"] = Value::String(end.to_string());
    }
    Ok(body)
}

impl CloudProvider for SnapshotProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn get_function(&self, name: &str) -> Result<FunctionIdentity, ProviderError> {
        let function = self
            .snapshot
            .functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ProviderError::NotFound(format!("Function not found: {name}")))?;
        if function.denied {
            return Err(ProviderError::AccessDenied(format!(
                "not authorized to perform lambda:GetFunction on {name}"
            )));
        }
        Ok(FunctionIdentity { name: function.name.clone(), arn: function.arn.clone() })
    }

    fn list_tags(&self, identifier: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        let function = self
            .snapshot
            .functions
            .iter()
            .find(|f| f.arn.as_deref() == Some(identifier))
            .ok_or_else(|| ProviderError::NotFound(format!("No resource with ARN {identifier}")))?;
        match &function.tags_error {
            Some(message) => Err(ProviderError::Backend(message.clone())),
            None => Ok(function.tags.clone()),
        }
    }

    fn list_page(&self, request: &PageRequest<'_>) -> Result<Value, ProviderError> {
        let page_size = self.page_size(request.limit);
        match request.query {
            ListQuery::Apis => {
                if let Some(message) = &self.snapshot.apis_error {
                    return Err(ProviderError::Backend(message.clone()));
                }
                let items = self
                    .snapshot
                    .apis
                    .iter()
                    .map(|api| json!({ "id": api.id, "name": api.name }))
                    .collect();
                page_of(items, request.cursor, page_size)
            }
            ListQuery::Resources { api_id } => {
                let api = self.api(api_id)?;
                if let Some(message) = &api.resources_error {
                    return Err(ProviderError::Backend(message.clone()));
                }
                let items = api
                    .resources
                    .iter()
                    .map(|resource| {
                        let mut item = json!({ "id": resource.id });
                        if let Some(path) = &resource.path {
                            item["path"] = Value::String(path.clone());
                        }
                        if !resource.methods.is_empty() {
                            let methods: serde_json::Map<String, Value> = resource
                                .methods
                                .keys()
                                .map(|method| (method.clone(), json!({})))
                                .collect();
                            item["resourceMethods"] = Value::Object(methods);
                        }
                        item
                    })
                    .collect();
                page_of(items, request.cursor, page_size)
            }
        }
    }

    fn get_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<Option<String>, ProviderError> {
        let method = self
            .api(api_id)?
            .resources
            .iter()
            .find(|resource| resource.id == resource_id)
            .and_then(|resource| resource.methods.get(http_method))
            .ok_or_else(|| {
                ProviderError::NotFound(format!("Invalid method {http_method} on {resource_id}"))
            })?;
        match &method.uri {
            Some(uri) => Ok(Some(uri.clone())),
            None => Err(ProviderError::NotConfigured(format!(
                "No integration defined for method {http_method} on {resource_id}"
            ))),
        }
    }
}
