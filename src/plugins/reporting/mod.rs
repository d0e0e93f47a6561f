//! Built-in reporting plugins and the report-file helper they share.

pub mod do_nothing;
pub mod json;
pub mod print_to_console;
pub mod write_jenkins_warnings_ng;

use crate::error::ReportError;
use crate::models::{Issue, Package};
use crate::plugins::PluginContext;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `contents` to `<dir>/<package>-<level><suffix>`, creating `dir`.
pub fn write_report(
    dir: &Path,
    package: &Package,
    level: &str,
    suffix: &str,
    contents: &str,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}-{}{}", package.name, level, suffix));
    info!("Writing output to {}", path.display());
    fs::write(&path, contents).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Report directory for `package`: the configured per-package output
/// directory, else the current directory.
pub fn report_dir(ctx: &PluginContext, package: &Package, level: &str) -> PathBuf {
    ctx.settings
        .package_output_dir(&package.name, level)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `issues` without repeats, first occurrence kept.
pub fn unique_issues(issues: &[Issue]) -> Vec<&Issue> {
    let mut seen = HashSet::new();
    issues.iter().filter(|i| seen.insert(*i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_report_creates_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out/pkg-lint");
        let pkg = Package::new("pkg", "/src/pkg");
        let path = write_report(&target, &pkg, "lint", ".txt", "hello").unwrap();
        assert_eq!(path, target.join("pkg-lint.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_unique_issues_keeps_first_occurrence() {
        let a = Issue::new("/a", 1, "t", "x", 1, "m", None);
        let b = Issue::new("/b", 1, "t", "x", 1, "m", None);
        let list = vec![a.clone(), b.clone(), a.clone()];
        assert_eq!(unique_issues(&list), vec![&a, &b]);
    }
}
