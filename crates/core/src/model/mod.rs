//! Core data model for an audit run.
//!
//! - `FunctionIdentity`: what the provider reports for a function name.
//! - `ApiDescriptor` / `ResourceNode` / `IntegrationRecord`: the flattened
//!   API Gateway topology.
//! - `FunctionRecord`: the per-function result rendered into the report.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Identity of a deployed function as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionIdentity {
    pub name: String,
    /// Canonical identifier (the function ARN). Absent if the provider
    /// response did not carry one.
    pub arn: Option<String>,
}

/// One gateway API discovered in the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One resource of an API together with the HTTP methods it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub methods: BTreeSet<String>,
}

/// A configured method integration whose target URI is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub api_id: String,
    pub resource_id: String,
    pub http_method: String,
    pub target_uri: String,
}

/// An integration attached to a function because its URI embeds the
/// function identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationMatch {
    pub api_id: String,
    pub api_name: String,
    pub resource_id: String,
    pub http_method: String,
    pub target_uri: String,
}

impl IntegrationMatch {
    pub fn new(api_name: impl Into<String>, record: &IntegrationRecord) -> Self {
        Self {
            api_id: record.api_id.clone(),
            api_name: api_name.into(),
            resource_id: record.resource_id.clone(),
            http_method: record.http_method.clone(),
            target_uri: record.target_uri.clone(),
        }
    }
}

/// Audit result for one requested function name.
///
/// `integrations` is only ever non-empty when `found` is true and
/// `identifier` is set; the constructors below are the only way the audit
/// pipeline builds records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub found: bool,
    pub identifier: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub owner_tag: Option<String>,
    pub integrations: Vec<IntegrationMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FunctionRecord {
    /// Record for a function whose identity lookup failed.
    pub fn not_found(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            found: false,
            identifier: None,
            tags: BTreeMap::new(),
            owner_tag: None,
            integrations: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Record for a function that exists but whose identity carries no ARN.
    pub fn found_without_identifier(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            found: true,
            identifier: None,
            tags: BTreeMap::new(),
            owner_tag: None,
            integrations: Vec::new(),
            error: None,
        }
    }

    /// Record for a function that exists and has a canonical identifier.
    pub fn found(
        name: impl Into<String>,
        identifier: impl Into<String>,
        tags: BTreeMap<String, String>,
        owner_tag: Option<String>,
        integrations: Vec<IntegrationMatch>,
    ) -> Self {
        Self {
            name: name.into(),
            found: true,
            identifier: Some(identifier.into()),
            tags,
            owner_tag,
            integrations,
            error: None,
        }
    }

    pub fn is_integrated(&self) -> bool {
        !self.integrations.is_empty()
    }
}
