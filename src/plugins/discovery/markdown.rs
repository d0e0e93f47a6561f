//! Finds Markdown documents.

use super::{collect_files, has_extension};
use crate::exceptions::Exceptions;
use crate::models::package::MARKDOWN_SRC;
use crate::models::Package;
use crate::plugins::{DiscoveryPlugin, PluginContext};

pub struct MarkdownDiscoveryPlugin;

impl DiscoveryPlugin for MarkdownDiscoveryPlugin {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn scan(
        &self,
        _ctx: &PluginContext,
        package: &mut Package,
        _level: &str,
        exceptions: Option<&Exceptions>,
    ) {
        collect_files(package, exceptions, MARKDOWN_SRC, "markdown", |f| {
            has_extension(f, &[".md"])
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::context;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_finds_markdown() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# hi\n").unwrap();
        fs::write(dir.path().join("notes.rst"), "").unwrap();
        let mut pkg = Package::from_path(dir.path());
        MarkdownDiscoveryPlugin.scan(&context(), &mut pkg, "lint", None);
        assert_eq!(pkg.markdown_src().len(), 1);
    }
}
