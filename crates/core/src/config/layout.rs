use std::path::{Path, PathBuf};

/// Logical layout of the audit outputs on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI or other frontends are responsible for actually creating directories
/// and files based on this layout.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    /// Root directory the run was started from.
    pub root: PathBuf,
    /// Directory for inventory artifacts (inventory).
    pub inventory_dir: PathBuf,
    /// Markdown report (inventory/function_integration_report.md).
    pub report_path: PathBuf,
    /// Machine-readable run summary (inventory/function_integration_report.json).
    pub summary_path: PathBuf,
}

impl ReportLayout {
    /// Compute the default layout rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let inventory_dir = root.join("inventory");
        let report_path = inventory_dir.join("function_integration_report.md");
        let summary_path = inventory_dir.join("function_integration_report.json");

        Self { root, inventory_dir, report_path, summary_path }
    }

    /// Report path relative to `root` when possible, for display.
    pub fn report_path_relative_string(&self) -> String {
        match self.report_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.report_path.to_string_lossy().to_string(),
        }
    }
}
