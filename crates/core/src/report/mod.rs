//! Markdown rendering of audit results.
//!
//! Rendering is a pure function of the region and the ordered records: the
//! same input always produces byte-identical output. Tags are emitted sorted
//! by key.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::model::FunctionRecord;

pub const REPORT_TITLE: &str = "# Lambda verification report";
pub const NOT_FOUND_STATUS: &str = "- Status: NOT FOUND or access denied";
pub const NO_INTEGRATIONS: &str = "- Integrated by APIs: none found";

/// Render the full report document.
pub fn render_report(region: &str, records: &[FunctionRecord]) -> String {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push_str("\n\n");
    let _ = writeln!(out, "Region: {region}");
    out.push('\n');
    for record in records {
        render_section(&mut out, record);
        out.push('\n');
    }
    out
}

fn render_section(out: &mut String, record: &FunctionRecord) {
    let _ = writeln!(out, "## {}", record.name);

    if !record.found {
        out.push_str(NOT_FOUND_STATUS);
        out.push('\n');
        let _ = writeln!(out, "- Error: {}", record.error.as_deref().unwrap_or_default());
        return;
    }

    let _ = writeln!(out, "- ARN: {}", record.identifier.as_deref().unwrap_or("unknown"));

    if record.tags.is_empty() {
        out.push_str("- Tags: none\n");
    } else {
        out.push_str("- Tags:\n");
        for (key, value) in &record.tags {
            let _ = writeln!(out, "  - {key}: {value}");
        }
    }

    let _ = writeln!(out, "- OwnedBy: {}", record.owner_tag.as_deref().unwrap_or("unknown"));

    if record.integrations.is_empty() {
        out.push_str(NO_INTEGRATIONS);
        out.push('\n');
    } else {
        out.push_str("- Integrated by APIs:\n");
        for m in &record.integrations {
            let _ = writeln!(
                out,
                "  - {} ({}): {} {}",
                m.api_name, m.api_id, m.http_method, m.target_uri
            );
        }
    }
}

/// Headline counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub inspected: usize,
    pub found: usize,
    pub not_found: usize,
    pub integrated: usize,
    pub owned: usize,
}

impl AuditSummary {
    pub fn from_records(records: &[FunctionRecord]) -> Self {
        let found = records.iter().filter(|r| r.found).count();
        Self {
            inspected: records.len(),
            found,
            not_found: records.len() - found,
            integrated: records.iter().filter(|r| r.is_integrated()).count(),
            owned: records.iter().filter(|r| r.owner_tag.is_some()).count(),
        }
    }
}
