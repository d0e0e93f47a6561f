//! Settings discovery and effective run configuration.
//!
//! lintherd reads `lintherd.toml|yaml|yml` from the scan root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `profile`: `profile.yaml`
//! - `config`: `config.yaml`
//! - `exceptions`: `exceptions.yaml`
//! - `log_level`: unset (`RUST_LOG`, then `warn`)
//! - `check`, `timings`: false
//!
//! Document names that are not existing paths are looked up through the
//! resource chain (user paths first, then the bundled `rsc/`).
//!
//! Overrides precedence: CLI > settings file > defaults.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_PROFILE: &str = "profile.yaml";
pub const DEFAULT_CONFIG: &str = "config.yaml";
pub const DEFAULT_EXCEPTIONS: &str = "exceptions.yaml";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Default, Deserialize, Clone)]
/// Root settings loaded from `lintherd.toml|yaml`.
pub struct FileSettings {
    pub profile: Option<String>,
    pub config: Option<String>,
    pub user_config: Option<String>,
    pub exceptions: Option<String>,
    pub output_directory: Option<String>,
    pub level: Option<String>,
    #[serde(default)]
    pub user_paths: Option<Vec<String>>,
    pub log_level: Option<String>,
    pub max_procs: Option<usize>,
    pub mapping_file_suffix: Option<String>,
    pub check: Option<bool>,
    pub timings: Option<bool>,
    #[serde(default)]
    pub force_tool_list: Option<Vec<String>>,
    /// Tool name -> binary path overrides, `[bins]`.
    #[serde(default)]
    pub bins: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` defers to the settings file.
pub struct CliOverrides {
    pub root: Option<String>,
    pub profile: Option<String>,
    pub config: Option<String>,
    pub user_config: Option<String>,
    pub exceptions: Option<String>,
    pub output_directory: Option<String>,
    pub level: Option<String>,
    pub user_paths: Option<Vec<String>>,
    pub log_level: Option<String>,
    pub max_procs: Option<usize>,
    pub mapping_file_suffix: Option<String>,
    pub check: Option<bool>,
    pub timings: Option<bool>,
    pub force_tool_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
/// Fully-resolved settings shared with every plugin through the context.
pub struct Effective {
    pub root: PathBuf,
    pub profile: String,
    pub config: String,
    pub user_config: Option<String>,
    pub exceptions: String,
    pub output_directory: Option<PathBuf>,
    pub level: Option<String>,
    pub user_paths: Vec<PathBuf>,
    /// Explicit log level; `None` defers to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,
    pub max_procs: Option<usize>,
    pub mapping_file_suffix: Option<String>,
    pub check: bool,
    pub timings: bool,
    pub force_tool_list: Option<Vec<String>>,
    pub bins: HashMap<String, String>,
    /// Whether a `lintherd.toml|yaml` was found at the root.
    pub settings_found: bool,
}

impl Effective {
    /// Binary to invoke for `tool`, honoring `[bins]` overrides.
    pub fn binary_for<'a>(&'a self, tool: &'a str) -> &'a str {
        self.bins.get(tool).map(String::as_str).unwrap_or(tool)
    }

    /// Per-package output directory `<output_directory>/<package>-<level>`.
    pub fn package_output_dir(&self, package: &str, level: &str) -> Option<PathBuf> {
        self.output_directory
            .as_ref()
            .map(|d| d.join(format!("{}-{}", package, level)))
    }
}

/// Walk upward from `start` to find where settings live.
///
/// Stops when a `lintherd.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("lintherd.toml").exists()
            || cur.join("lintherd.yaml").exists()
            || cur.join("lintherd.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FileSettings` from `lintherd.toml` or `lintherd.yaml|yml` if present.
///
/// An unparseable settings file is reported and ignored.
pub fn load_settings(root: &Path) -> Option<FileSettings> {
    let toml_path = root.join("lintherd.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str::<FileSettings>(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!("ignoring {}: {}", toml_path.display(), e);
                None
            }
        };
    }
    for yml in ["lintherd.yaml", "lintherd.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str::<FileSettings>(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!("ignoring {}: {}", p.display(), e);
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered settings, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Effective {
    let start = PathBuf::from(cli.root.as_deref().unwrap_or("."));
    let root = detect_root(&start);
    let loaded = load_settings(&root);
    let settings_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let profile = cli
        .profile
        .clone()
        .or(cfg.profile)
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    let config = cli
        .config
        .clone()
        .or(cfg.config)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let user_config = cli.user_config.clone().or(cfg.user_config);
    let exceptions = cli
        .exceptions
        .clone()
        .or(cfg.exceptions)
        .unwrap_or_else(|| DEFAULT_EXCEPTIONS.to_string());
    let output_directory = cli
        .output_directory
        .clone()
        .or(cfg.output_directory)
        .map(PathBuf::from);
    let level = cli.level.clone().or(cfg.level);
    let user_paths = cli
        .user_paths
        .clone()
        .or(cfg.user_paths)
        .unwrap_or_default()
        .into_iter()
        .map(|p| {
            let p = PathBuf::from(p);
            // Relative paths in the settings file are relative to its root.
            if p.is_relative() && !p.exists() {
                root.join(p)
            } else {
                p
            }
        })
        .collect();
    let log_level = cli.log_level.clone().or(cfg.log_level);
    let max_procs = cli.max_procs.or(cfg.max_procs);
    let mapping_file_suffix = cli.mapping_file_suffix.clone().or(cfg.mapping_file_suffix);
    let check = cli.check.or(cfg.check).unwrap_or(false);
    let timings = cli.timings.or(cfg.timings).unwrap_or(false);
    let force_tool_list = cli.force_tool_list.clone().or(cfg.force_tool_list);
    let bins = cfg.bins.unwrap_or_default();

    Effective {
        root,
        profile,
        config,
        user_config,
        exceptions,
        output_directory,
        level,
        user_paths,
        log_level,
        max_procs,
        mapping_file_suffix,
        check,
        timings,
        force_tool_list,
        bins,
        settings_found,
    }
}

/// Split a comma separated CLI list, dropping empty entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn cli_at(root: &Path) -> CliOverrides {
        CliOverrides {
            root: root.to_str().map(String::from),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(&cli_at(dir.path()));
        assert_eq!(eff.profile, DEFAULT_PROFILE);
        assert_eq!(eff.config, DEFAULT_CONFIG);
        assert_eq!(eff.exceptions, DEFAULT_EXCEPTIONS);
        assert!(eff.log_level.is_none());
        assert!(!eff.check);
        assert!(eff.output_directory.is_none());
        assert!(!eff.settings_found);
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("lintherd.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
profile = "ci-profile.yaml"
level = "strict"
check = true
force_tool_list = ["pylint", "mypy"]
[bins]
pylint = "/opt/bin/pylint"
    "#
        )
        .unwrap();

        let nested = root.join("src/pkg");
        fs::create_dir_all(&nested).unwrap();
        let eff = resolve_effective(&cli_at(&nested));
        assert_eq!(eff.root, root);
        assert!(eff.settings_found);
        assert_eq!(eff.profile, "ci-profile.yaml");
        assert_eq!(eff.level.as_deref(), Some("strict"));
        assert!(eff.check);
        assert_eq!(eff.force_tool_list.as_ref().unwrap().len(), 2);
        assert_eq!(eff.binary_for("pylint"), "/opt/bin/pylint");
        assert_eq!(eff.binary_for("mypy"), "mypy");
    }

    #[test]
    fn test_load_yaml_and_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("lintherd.yaml"),
            "exceptions: team-exceptions.yaml\nlog_level: info\ncheck: true\n",
        )
        .unwrap();

        let mut cli = cli_at(root);
        cli.log_level = Some("debug".into());
        cli.check = Some(false);
        let eff = resolve_effective(&cli);
        assert_eq!(eff.exceptions, "team-exceptions.yaml");
        assert_eq!(eff.log_level.as_deref(), Some("debug"));
        assert!(!eff.check);
    }

    #[test]
    fn test_package_output_dir() {
        let eff = Effective {
            output_directory: Some(PathBuf::from("/tmp/out")),
            ..Effective::default()
        };
        assert_eq!(
            eff.package_output_dir("pkg", "strict"),
            Some(PathBuf::from("/tmp/out/pkg-strict"))
        );
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("pylint, mypy,,"), vec!["pylint", "mypy"]);
    }
}
