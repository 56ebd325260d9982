//! Function list input.
//!
//! One function name per line; surrounding whitespace is trimmed, blank lines
//! and `#` comment lines are skipped. Order and duplicates are preserved.

use std::fs;
use std::path::Path;

use crate::error::{AuditError, AuditResult};

pub fn parse_function_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read and parse the function list at `path`.
///
/// A missing file is reported as [`AuditError::InputFileMissing`] so the CLI
/// can exit before any provider is constructed.
pub fn read_function_names(path: &Path) -> AuditResult<Vec<String>> {
    if !path.is_file() {
        return Err(AuditError::InputFileMissing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)
        .map_err(|source| AuditError::InputRead { path: path.to_path_buf(), source })?;
    Ok(parse_function_names(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let names = parse_function_names("fn-a\n# comment\n\n  fn-b  \r\n   # indented comment\nfn-a\n");
        assert_eq!(names, vec!["fn-a", "fn-b", "fn-a"]);
    }

    #[test]
    fn missing_file_is_distinct_error() {
        let err = read_function_names(Path::new("definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, AuditError::InputFileMissing(_)));
    }

    #[test]
    fn reads_names_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.txt");
        fs::write(&path, "orders\n#skip\npayments\n").unwrap();
        assert_eq!(read_function_names(&path).unwrap(), vec!["orders", "payments"]);
    }
}
