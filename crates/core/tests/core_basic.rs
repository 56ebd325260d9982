use lambda_audit_core::model::FunctionRecord;
use lambda_audit_core::report::{render_report, AuditSummary};
use lambda_audit_core::version;

#[test]
fn version_is_non_empty() {
    let v = version();
    assert!(!v.is_empty());
}

#[test]
fn summary_counts_each_record_once() {
    let records = vec![
        FunctionRecord::not_found("gone", "Resource not found"),
        FunctionRecord::found_without_identifier("odd"),
        FunctionRecord::not_found("gone", "Resource not found"),
    ];
    let summary = AuditSummary::from_records(&records);
    assert_eq!(summary.inspected, 3);
    assert_eq!(summary.found, 1);
    assert_eq!(summary.not_found, 2);
    assert_eq!(summary.integrated, 0);

    let report = render_report("us-east-1", &records);
    assert_eq!(report.matches("## gone\n").count(), 2);
    assert!(report.contains("## odd\n- ARN: unknown\n"));
}
