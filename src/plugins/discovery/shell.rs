//! Finds shell scripts by extension or `file` sniffing.

use super::{collect_files, file_output_mentions, has_extension};
use crate::exceptions::Exceptions;
use crate::models::package::SHELL_SRC;
use crate::models::Package;
use crate::plugins::{DiscoveryPlugin, PluginContext};

const SHELL_EXTENSIONS: &[&str] = &[".sh", ".bash", ".zsh", ".csh", ".ksh", ".dash"];
const SHELL_OUTPUT: &[&str] = &["shell script", "dash script", "zsh script"];

pub struct ShellDiscoveryPlugin;

impl DiscoveryPlugin for ShellDiscoveryPlugin {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn scan(
        &self,
        _ctx: &PluginContext,
        package: &mut Package,
        _level: &str,
        exceptions: Option<&Exceptions>,
    ) {
        collect_files(package, exceptions, SHELL_SRC, "shell", |f| {
            has_extension(f, SHELL_EXTENSIONS) || file_output_mentions(f, SHELL_OUTPUT)
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
    fn test_finds_shell_files_once() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("build.sh"), "#!/bin/sh\necho hi\n").unwrap();
        fs::write(dir.path().join("env.zsh"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "plain text\n").unwrap();
        let mut pkg = Package::from_path(dir.path());
        ShellDiscoveryPlugin.scan(&context(), &mut pkg, "lint", None);
        let names: Vec<_> = pkg
            .shell_src()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["build.sh", "env.zsh"]);
    }
}
