//! Built-in discovery plugins.
//!
//! Every plugin shares one filesystem walk per package (see
//! [`Package::walk_files`]) and differs only in which files it claims.

pub mod c;
pub mod markdown;
pub mod python;
pub mod shell;
pub mod yaml;

use crate::exceptions::Exceptions;
use crate::models::{Package, PackageFile};
use std::path::PathBuf;
use tracing::info;

/// Walk `package` if needed, keep the files `claims` accepts, apply early
/// file exceptions and store the result under `tag`.
pub fn collect_files<F>(
    package: &mut Package,
    exceptions: Option<&Exceptions>,
    tag: &str,
    label: &str,
    claims: F,
) where
    F: Fn(&PackageFile) -> bool,
{
    package.walk_files();
    let mut files: Vec<PathBuf> = package
        .files
        .values()
        .filter(|f| claims(f))
        .map(|f| f.path.clone())
        .collect();
    info!("  {} {} files found.", files.len(), label);
    if let Some(exceptions) = exceptions {
        let found = files.len();
        files = exceptions.filter_file_exceptions_early(package, files);
        if found > files.len() {
            info!("  After filtering, {} {} files will be scanned.", files.len(), label);
        }
    }
    package.set_paths(tag, files);
}

/// Whether the lowercased basename ends with any of `extensions`.
pub fn has_extension(file: &PackageFile, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| file.name.ends_with(ext))
}

/// Whether the `file` command output mentions any of `kinds`.
pub fn file_output_mentions(file: &PackageFile, kinds: &[&str]) -> bool {
    kinds.iter().any(|kind| file.file_cmd_out.contains(kind))
}
