#![cfg(all(unix, feature = "aws-cli-provider"))]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use lambda_audit_core::services::provider::{CloudProvider, ProviderError};
use lambda_audit_core::services::providers::AwsCliProvider;
use lambda_audit_core::services::{AuditOptions, AuditRunner};
use tempfile::tempdir;

const FN_ARN: &str = "arn:aws:lambda:eu-west-1:123456789012:function:orders";

/// Write a stand-in `aws` executable that answers from canned JSON and logs its argv.
fn fake_aws(dir: &Path) -> PathBuf {
    let log = dir.join("calls.log");
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
case "$2" in
  get-function)
    if [ "$4" = "orders" ]; then
      echo '{{"Configuration": {{"FunctionName": "orders", "FunctionArn": "{FN_ARN}"}}}}'
    else
      echo "An error occurred (ResourceNotFoundException) when calling the GetFunction operation: Function not found: $4" >&2
      exit 254
    fi
    ;;
  list-tags)
    echo '{{"Tags": {{"aws:cloudformation:stack-name": "shop"}}}}'
    ;;
  get-rest-apis)
    case "$*" in
      *--position*) echo '{{"items": [{{"id": "a2", "name": "second"}}]}}' ;;
      *) echo '{{"items": [{{"id": "a1", "name": "first"}}], "position": "next"}}' ;;
    esac
    ;;
  get-resources)
    echo '{{"items": [{{"id": "r1", "path": "/orders", "resourceMethods": {{"GET": {{}}, "PUT": {{}}}}}}]}}'
    ;;
  get-integration)
    case "$*" in
      *"--rest-api-id a1"*"--http-method GET"*)
        echo '{{"type": "AWS_PROXY", "uri": "arn:aws:apigateway:eu-west-1:lambda:path/2015-03-31/functions/{FN_ARN}/invocations"}}'
        ;;
      *)
        echo "An error occurred (NotFoundException) when calling the GetIntegration operation: Invalid Integration identifier specified" >&2
        exit 254
        ;;
    esac
    ;;
  *)
    echo "unexpected operation $2" >&2
    exit 2
    ;;
esac
"#,
        log = log.display(),
    );
    let path = dir.join("aws");
    fs::write(&path, script).expect("write fake aws");
    let mut perms = fs::metadata(&path).expect("stat fake aws").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod fake aws");
    path
}

#[test]
fn audit_through_fake_aws_cli() {
    let dir = tempdir().expect("tempdir");
    let bin = fake_aws(dir.path());
    let provider = AwsCliProvider::new("eu-west-1")
        .with_bin(&bin)
        .with_profile(Some("audit".to_string()));

    match provider.get_function("ghost") {
        Err(ProviderError::NotFound(message)) => assert!(message.contains("Function not found")),
        other => panic!("expected NotFound, got {other:?}"),
    }

    let options = AuditOptions::default();
    let names = vec!["orders".to_string(), "ghost".to_string()];
    let outcome = AuditRunner { provider: &provider, options: &options }.run(&names);

    let orders = &outcome.records[0];
    assert!(orders.found);
    assert_eq!(orders.identifier.as_deref(), Some(FN_ARN));
    assert_eq!(orders.owner_tag.as_deref(), Some("shop"));
    assert_eq!(orders.integrations.len(), 1);
    assert_eq!(orders.integrations[0].api_name, "first");
    assert_eq!(orders.integrations[0].http_method, "GET");
    assert!(!outcome.records[1].found);
    assert!(outcome.topology_warnings.is_empty());

    let calls = fs::read_to_string(dir.path().join("calls.log")).expect("read call log");
    assert!(calls.lines().all(|line| line.contains("--region eu-west-1 --output json")));
    assert!(calls.lines().all(|line| line.contains("--profile audit")));
    assert_eq!(calls.lines().filter(|l| l.starts_with("apigateway get-rest-apis")).count(), 2);
    assert!(calls.contains("--position next"));
    assert!(calls.contains("get-resources --rest-api-id a1 --limit 500"));
}
