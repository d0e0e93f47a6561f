//! A package is one source tree being scanned plus everything discovery
//! plugins learn about it.

use serde_json::Value as Json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const PYTHON_SRC: &str = "python_src";
pub const SHELL_SRC: &str = "shell_src";
pub const YAML_SRC: &str = "yaml";
pub const C_SRC: &str = "c_src";
pub const MARKDOWN_SRC: &str = "md_src";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Metadata recorded for every regular file under the package root.
pub struct PackageFile {
    /// Lowercased basename.
    pub name: String,
    pub path: PathBuf,
    /// Lowercased output of the `file` command, empty when unavailable.
    pub file_cmd_out: String,
}

#[derive(Debug, Clone, PartialEq)]
/// A value stored by a discovery plugin under a string tag.
pub enum Discovered {
    Paths(Vec<PathBuf>),
    Value(Json),
}

#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub path: PathBuf,
    pub files: BTreeMap<PathBuf, PackageFile>,
    walked: bool,
    discovered: BTreeMap<String, Discovered>,
}

impl Package {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            files: BTreeMap::new(),
            walked: false,
            discovered: BTreeMap::new(),
        }
    }

    /// Build a package named after the last component of `path`.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::new(name, path)
    }

    pub fn walked(&self) -> bool {
        self.walked
    }

    /// Walk the package root exactly once, recording every regular file.
    ///
    /// Later calls are no-ops so several discovery plugins can share one walk.
    pub fn walk_files(&mut self) {
        if self.walked {
            return;
        }
        let sniff = file_command_exists();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let abs = std::path::absolute(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
            let file_cmd_out = if sniff {
                file_cmd_output(&abs)
            } else {
                String::new()
            };
            let record = PackageFile {
                name: entry.file_name().to_string_lossy().to_lowercase(),
                path: abs.clone(),
                file_cmd_out,
            };
            self.files.insert(abs, record);
        }
        self.walked = true;
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.discovered.contains_key(tag)
    }

    pub fn get(&self, tag: &str) -> Option<&Discovered> {
        self.discovered.get(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: Discovered) {
        self.discovered.insert(tag.into(), value);
    }

    pub fn set_paths(&mut self, tag: impl Into<String>, paths: Vec<PathBuf>) {
        self.insert(tag, Discovered::Paths(paths));
    }

    pub fn set_value(&mut self, tag: impl Into<String>, value: Json) {
        self.insert(tag, Discovered::Value(value));
    }

    /// Paths stored under `tag`; empty when the tag is absent or holds a
    /// structured value.
    pub fn paths(&self, tag: &str) -> &[PathBuf] {
        match self.discovered.get(tag) {
            Some(Discovered::Paths(p)) => p,
            _ => &[],
        }
    }

    pub fn value(&self, tag: &str) -> Option<&Json> {
        match self.discovered.get(tag) {
            Some(Discovered::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.discovered.keys().map(String::as_str)
    }

    pub fn python_src(&self) -> &[PathBuf] {
        self.paths(PYTHON_SRC)
    }

    pub fn shell_src(&self) -> &[PathBuf] {
        self.paths(SHELL_SRC)
    }

    pub fn yaml_src(&self) -> &[PathBuf] {
        self.paths(YAML_SRC)
    }

    pub fn c_src(&self) -> &[PathBuf] {
        self.paths(C_SRC)
    }

    pub fn markdown_src(&self) -> &[PathBuf] {
        self.paths(MARKDOWN_SRC)
    }
}

fn file_command_exists() -> bool {
    let name = if cfg!(windows) { "file.exe" } else { "file" };
    crate::plugins::command_exists(name)
}

/// Lowercased output of `file <path>`, or empty on any failure.
fn file_cmd_output(path: &Path) -> String {
    match Command::new("file").arg(path).output() {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).to_lowercase(),
        Ok(out) => {
            warn!(
                "Failed to run 'file' command. Returncode = {}",
                out.status.code().unwrap_or(-1)
            );
            String::new()
        }
        Err(e) => {
            warn!("OSError on file command for {}: {}", path.display(), e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_path_uses_basename() {
        let pkg = Package::from_path(Path::new("/work/src/my_pkg"));
        assert_eq!(pkg.name, "my_pkg");
        assert_eq!(pkg.path, PathBuf::from("/work/src/my_pkg"));
    }

    #[test]
    fn test_walk_files_runs_once() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Setup.PY"), "print(1)\n").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/run.sh"), "#!/bin/sh\n").unwrap();

        let mut pkg = Package::from_path(dir.path());
        assert!(!pkg.walked());
        pkg.walk_files();
        assert!(pkg.walked());
        assert_eq!(pkg.files.len(), 2);
        assert!(pkg.files.values().any(|f| f.name == "setup.py"));

        // A file added after the first walk is not picked up.
        fs::write(dir.path().join("late.py"), "").unwrap();
        pkg.walk_files();
        assert_eq!(pkg.files.len(), 2);
    }

    #[test]
    fn test_discovered_side_table() {
        let mut pkg = Package::new("pkg", "/tmp/pkg");
        assert!(pkg.python_src().is_empty());
        pkg.set_paths(PYTHON_SRC, vec![PathBuf::from("/tmp/pkg/a.py")]);
        pkg.set_value("make_targets", serde_json::json!([{"name": "all"}]));
        assert_eq!(pkg.python_src().len(), 1);
        assert!(pkg.contains("make_targets"));
        assert!(pkg.paths("make_targets").is_empty());
        assert_eq!(pkg.value("make_targets").unwrap()[0]["name"], "all");
        assert_eq!(pkg.tags().collect::<Vec<_>>(), vec!["make_targets", "python_src"]);
    }
}
