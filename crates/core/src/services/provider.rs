use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

use crate::model::FunctionIdentity;

/// Response field carrying the pagination cursor on API Gateway list calls.
pub const CURSOR_FIELD: &str = "position";

/// Errors returned by provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    /// The method exists but has no backend integration.
    #[error("Integration not configured: {0}")]
    NotConfigured(String),
    #[error("Provider error: {0}")]
    Backend(String),
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
    /// The provider handed back a cursor already followed in this enumeration.
    #[error("Pagination cursor repeated for {query}: {cursor}")]
    PaginationLoop { query: String, cursor: String },
}

impl ProviderError {
    /// True for the errors that mean "this function cannot be seen by us".
    pub fn is_not_found_or_denied(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::AccessDenied(_))
    }
}

/// List-style queries that return cursor-paginated pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    /// All REST APIs in the region.
    Apis,
    /// Resources of one REST API.
    Resources { api_id: String },
}

impl ListQuery {
    /// Page fields that may carry the items for this query, in probe order.
    ///
    /// Endpoints do not agree on a field name, so the enumerator consults this
    /// table instead of special-casing each call.
    pub fn item_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Apis => &["items", "restApis"],
            Self::Resources { .. } => &["items", "resources"],
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Apis => "rest apis".to_string(),
            Self::Resources { api_id } => format!("resources of api {api_id}"),
        }
    }
}

/// Arguments for fetching one page of a [`ListQuery`].
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub query: &'a ListQuery,
    pub cursor: Option<&'a str>,
    pub limit: Option<u32>,
}

/// Read-only capabilities the audit needs from a cloud account.
///
/// Implementations are constructed once at startup and passed down explicitly
/// to the orchestrator, inspector and topology walker.
pub trait CloudProvider: Send + Sync {
    /// Short name used in logs and the run summary.
    fn name(&self) -> &'static str;

    /// Look up a function by name.
    fn get_function(&self, name: &str) -> Result<FunctionIdentity, ProviderError>;

    /// Tags attached to the resource with the given identifier.
    fn list_tags(&self, identifier: &str) -> Result<BTreeMap<String, String>, ProviderError>;

    /// Fetch one raw page of a list query.
    ///
    /// The page is returned as the provider's JSON document; item extraction
    /// and cursor handling live in [`crate::services::pagination`].
    fn list_page(&self, request: &PageRequest<'_>) -> Result<Value, ProviderError>;

    /// Target URI of the integration configured for a resource method.
    ///
    /// `Ok(None)` means the integration exists but carries no URI (mock or
    /// HTTP-proxy style integrations); a method without any integration is
    /// [`ProviderError::NotConfigured`].
    fn get_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<Option<String>, ProviderError>;
}
