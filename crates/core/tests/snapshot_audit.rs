use std::fs;

use lambda_audit_core::config::{AuditConfig, ProviderKind};
use lambda_audit_core::input::read_function_names;
use lambda_audit_core::report::{render_report, AuditSummary, NOT_FOUND_STATUS, NO_INTEGRATIONS};
use lambda_audit_core::services::providers::build_provider;
use lambda_audit_core::services::AuditRunner;
use tempfile::tempdir;

const ACCOUNT: &str = r#"
region: us-east-1
page_size: 1
functions:
  - name: fn-a
    arn: arn:aws:lambda:us-east-1:123456789012:function:fn-a
    tags:
      aws:cloudformation:stack-name: demo
      team: core
apis:
  - id: abc123
    name: public
    resources:
      - id: root
        path: /
      - id: r1
        path: /a
        methods:
          GET:
            uri: arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-east-1:123456789012:function:fn-a/invocations
          OPTIONS: {}
  - id: def456
    name: internal
    resources:
      - id: r9
        path: /other
        methods:
          POST:
            uri: arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-east-1:123456789012:function:fn-other/invocations
"#;

fn write_inputs(dir: &std::path::Path, account: &str) -> AuditConfig {
    fs::write(dir.join("account.yaml"), account).expect("write snapshot");
    fs::write(dir.join("functions.txt"), "fn-a\n# comment\nfn-b\n").expect("write names");
    AuditConfig {
        provider: ProviderKind::Snapshot,
        snapshot: Some(dir.join("account.yaml")),
        ..AuditConfig::default()
    }
}

#[test]
fn snapshot_run_produces_two_sections() {
    let dir = tempdir().expect("tempdir");
    let config = write_inputs(dir.path(), ACCOUNT);

    let names = read_function_names(&dir.path().join("functions.txt")).expect("read names");
    assert_eq!(names, vec!["fn-a", "fn-b"]);

    let provider = build_provider(&config).expect("build provider");
    let options = config.audit_options();
    let outcome = AuditRunner { provider: provider.as_ref(), options: &options }.run(&names);
    let report = render_report(&config.region, &outcome.records);

    assert_eq!(report.matches("\n## ").count(), 2);
    assert!(report.contains("## fn-a\n- ARN: arn:aws:lambda:us-east-1:123456789012:function:fn-a\n"));
    assert!(report.contains("- OwnedBy: demo\n"));
    assert!(report.contains(
        "  - public (abc123): GET arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/arn:aws:lambda:us-east-1:123456789012:function:fn-a/invocations\n"
    ));
    assert!(!report.contains("internal (def456)"));
    assert!(report.contains(&format!("## fn-b\n{NOT_FOUND_STATUS}\n- Error: ")));

    let summary = AuditSummary::from_records(&outcome.records);
    assert_eq!(summary.inspected, 2);
    assert_eq!(summary.found, 1);
    assert_eq!(summary.integrated, 1);
    assert_eq!(outcome.topology_walks, 1);
}

#[test]
fn rendering_is_deterministic_across_runs() {
    let dir = tempdir().expect("tempdir");
    let config = write_inputs(dir.path(), ACCOUNT);
    let names = vec!["fn-a".to_string(), "fn-b".to_string(), "fn-a".to_string()];

    let render = || {
        let provider = build_provider(&config).expect("build provider");
        let options = config.audit_options();
        let outcome = AuditRunner { provider: provider.as_ref(), options: &options }.run(&names);
        render_report(&config.region, &outcome.records)
    };
    assert_eq!(render(), render());
}

#[test]
fn broken_api_listing_still_reports_functions() {
    let dir = tempdir().expect("tempdir");
    let account = format!("{ACCOUNT}apis_error: \"AccessDeniedException: apigateway:GET\"\n");
    let config = write_inputs(dir.path(), &account);

    let provider = build_provider(&config).expect("build provider");
    let options = config.audit_options();
    let names = vec!["fn-a".to_string()];
    let outcome = AuditRunner { provider: provider.as_ref(), options: &options }.run(&names);
    let report = render_report(&config.region, &outcome.records);

    assert!(report.contains("- OwnedBy: demo\n"));
    assert!(report.contains(NO_INTEGRATIONS));
    assert_eq!(outcome.topology_warnings.len(), 1);
}

#[test]
fn broken_resource_listing_skips_only_that_api() {
    let dir = tempdir().expect("tempdir");
    let account = ACCOUNT.replace(
        "  - id: def456\n    name: internal\n",
        "  - id: def456\n    name: internal\n    resources_error: throttled\n",
    );
    let config = write_inputs(dir.path(), &account);

    let provider = build_provider(&config).expect("build provider");
    let options = config.audit_options();
    let names = vec!["fn-a".to_string()];
    let outcome = AuditRunner { provider: provider.as_ref(), options: &options }.run(&names);

    assert_eq!(outcome.records[0].integrations.len(), 1);
    assert_eq!(outcome.topology_warnings.len(), 1);
    assert!(outcome.topology_warnings[0].contains("def456"));
}
