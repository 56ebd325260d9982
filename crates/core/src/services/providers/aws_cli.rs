use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use serde_json::Value;

use crate::model::FunctionIdentity;
use crate::services::provider::{CloudProvider, ListQuery, PageRequest, ProviderError};

/// Provider that shells out to the `aws` command line tool.
///
/// Credentials, profiles and endpoints are resolved by the AWS CLI itself;
/// this adapter only builds read-only commands and classifies their failures.
#[derive(Debug, Clone)]
pub struct AwsCliProvider {
    bin: PathBuf,
    region: String,
    profile: Option<String>,
}

impl AwsCliProvider {
    pub fn new(region: impl Into<String>) -> Self {
        Self { bin: resolve_aws_path(), region: region.into(), profile: None }
    }

    pub fn with_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.bin = bin.into();
        self
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    /// Run `aws <service> <operation> <args>` and parse its JSON output.
    fn run_json(
        &self,
        service: &str,
        operation: &str,
        args: &[String],
    ) -> Result<Value, ProviderError> {
        let mut command = Command::new(&self.bin);
        command.arg(service).arg(operation).args(args);
        command.args(["--region", self.region.as_str(), "--output", "json"]);
        if let Some(profile) = &self.profile {
            command.args(["--profile", profile.as_str()]);
        }
        tracing::debug!(bin = %self.bin.display(), service, operation, ?args, "running aws cli");

        let output = command
            .output()
            .map_err(|e| ProviderError::Backend(format!("failed to spawn aws cli: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(classify_failure(operation, &output.status.to_string(), &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&stdout).map_err(|e| {
            let context = format!("aws {service} {operation} returned bad JSON");
            ProviderError::InvalidResponse(format!("{context}: {e}"))
        })
    }
}

/// Binary from `AWS_CLI_BIN`, or `aws` on PATH.
pub fn resolve_aws_path() -> PathBuf {
    std::env::var_os("AWS_CLI_BIN").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("aws"))
}

/// Map an AWS CLI failure to a [`ProviderError`] using the service error code
/// in its stderr (`An error occurred (<Code>) when calling ...`).
pub fn classify_failure(operation: &str, status: &str, stderr: &str) -> ProviderError {
    let message = if stderr.is_empty() {
        format!("aws {operation} exited with {status}")
    } else {
        stderr.to_string()
    };

    if stderr.contains("(ResourceNotFoundException)") {
        ProviderError::NotFound(message)
    } else if stderr.contains("(AccessDenied")
        || stderr.contains("(UnauthorizedOperation)")
        || stderr.contains("(UnrecognizedClientException)")
        || stderr.contains("not authorized to perform")
    {
        ProviderError::AccessDenied(message)
    } else if stderr.contains("(NotFoundException)") && operation == "get-integration" {
        ProviderError::NotConfigured(message)
    } else if stderr.contains("(NotFoundException)") {
        ProviderError::NotFound(message)
    } else {
        ProviderError::Backend(message)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetFunctionOutput {
    #[serde(default)]
    configuration: Option<FunctionConfiguration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FunctionConfiguration {
    #[serde(default)]
    function_name: Option<String>,
    #[serde(default)]
    function_arn: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListTagsOutput {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct GetIntegrationOutput {
    #[serde(default)]
    uri: Option<String>,
}

fn parse_function(name: &str, body: Value) -> Result<FunctionIdentity, ProviderError> {
    let out: GetFunctionOutput = serde_json::from_value(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("get-function: {e}")))?;
    let config = out.configuration;
    Ok(FunctionIdentity {
        name: config
            .as_ref()
            .and_then(|c| c.function_name.clone())
            .unwrap_or_else(|| name.to_string()),
        arn: config.and_then(|c| c.function_arn),
    })
}

fn page_args(request: &PageRequest<'_>) -> Vec<String> {
    let mut args = Vec::new();
    if let ListQuery::Resources { api_id } = request.query {
        args.extend(["--rest-api-id".to_string(), api_id.clone()]);
    }
    if let Some(limit) = request.limit {
        args.extend(["--limit".to_string(), limit.to_string()]);
    }
    if let Some(cursor) = request.cursor {
        args.extend(["--position".to_string(), cursor.to_string()]);
    }
    // One page per call; the enumerator follows `position` itself.
    args.push("--no-paginate".to_string());
    args
}

impl CloudProvider for AwsCliProvider {
    fn name(&self) -> &'static str {
        "aws-cli"
    }

    fn get_function(&self, name: &str) -> Result<FunctionIdentity, ProviderError> {
        let body =
            self.run_json("lambda", "get-function", &["--function-name".into(), name.into()])?;
        parse_function(name, body)
    }

    fn list_tags(&self, identifier: &str) -> Result<BTreeMap<String, String>, ProviderError> {
        let body = self.run_json("lambda", "list-tags", &["--resource".into(), identifier.into()])?;
        let out: ListTagsOutput = serde_json::from_value(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("list-tags: {e}")))?;
        Ok(out.tags)
    }

    fn list_page(&self, request: &PageRequest<'_>) -> Result<Value, ProviderError> {
        let operation = match request.query {
            ListQuery::Apis => "get-rest-apis",
            ListQuery::Resources { .. } => "get-resources",
        };
        self.run_json("apigateway", operation, &page_args(request))
    }

    fn get_integration(
        &self,
        api_id: &str,
        resource_id: &str,
        http_method: &str,
    ) -> Result<Option<String>, ProviderError> {
        let args = [
            "--rest-api-id".to_string(),
            api_id.to_string(),
            "--resource-id".to_string(),
            resource_id.to_string(),
            "--http-method".to_string(),
            http_method.to_string(),
        ];
        let body = self.run_json("apigateway", "get-integration", &args)?;
        let out: GetIntegrationOutput = serde_json::from_value(body)
            .map_err(|e| ProviderError::InvalidResponse(format!("get-integration: {e}")))?;
        Ok(out.uri)
    }
}
