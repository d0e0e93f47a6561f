//! Scan orchestration.
//!
//! A [`Runner`] scans one package at a time:
//! 1. resolve the level (override, settings, or profile);
//! 2. run discovery plugins, dependencies first;
//! 3. run tool plugins, dependencies first, honoring a forced tool list;
//! 4. filter issues through the exceptions;
//! 5. hand the result to every enabled reporting plugin.
//!
//! Workspaces are scanned package by package in parallel. Config,
//! exceptions and resources are shared read-only; each package is owned by
//! exactly one scan.

use crate::config::{Config, DEFAULT_LEVEL};
use crate::error::RunError;
use crate::exceptions::Exceptions;
use crate::models::level::PluginType;
use crate::models::{IssueMap, Package};
use crate::plugins::{dependency_order, PluginContext, PluginRegistry};
use crate::profile::Profile;
use crate::resources::Resources;
use crate::settings::Effective;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Files whose presence marks a directory as a package in a workspace.
pub const PACKAGE_MARKERS: &[&str] = &[
    "package.xml",
    "setup.py",
    "pyproject.toml",
    "CMakeLists.txt",
    "Cargo.toml",
];

#[derive(Debug, Clone, Serialize)]
/// Wall time spent in one plugin for one package.
pub struct Timing {
    pub package: String,
    pub name: String,
    pub plugin_type: String,
    #[serde(serialize_with = "as_secs")]
    pub duration: Duration,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

#[derive(Debug, Clone, Default)]
/// Outcome of scanning one package.
pub struct ScanResult {
    pub package: String,
    pub level: String,
    /// Filtered issues; failed tools are absent.
    pub issues: IssueMap,
    /// False when any tool or reporting plugin failed.
    pub success: bool,
    /// Summaries returned by reporting plugins, by plugin name.
    pub reports: BTreeMap<String, Json>,
}

impl ScanResult {
    pub fn issue_count(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }
}

#[derive(Debug)]
pub struct PackageOutcome {
    pub path: PathBuf,
    pub result: Result<ScanResult, RunError>,
}

pub struct Runner {
    ctx: PluginContext,
    exceptions: Arc<Exceptions>,
    profile: Option<Profile>,
    registry: PluginRegistry,
    timings: Mutex<Vec<Timing>>,
}

impl Runner {
    /// Load config, exceptions and (unless a level is fixed) the profile
    /// named by `settings`, looked up through the resource chain.
    pub fn new(settings: Effective, registry: PluginRegistry) -> Result<Self, RunError> {
        let resources = Resources::new(&settings.user_paths);
        let config = load_config(&settings, &resources)?;

        let exceptions_path = resources
            .resolve(&settings.exceptions)
            .unwrap_or_else(|| PathBuf::from(&settings.exceptions));
        let exceptions = Exceptions::new(&exceptions_path)?;

        let profile = if settings.level.is_some() {
            None
        } else {
            let profile_path = resources
                .resolve(&settings.profile)
                .unwrap_or_else(|| PathBuf::from(&settings.profile));
            Some(Profile::new(&profile_path)?)
        };

        Ok(Self::from_parts(
            settings, config, exceptions, profile, resources, registry,
        ))
    }

    pub fn from_parts(
        settings: Effective,
        config: Config,
        exceptions: Exceptions,
        profile: Option<Profile>,
        resources: Resources,
        registry: PluginRegistry,
    ) -> Self {
        Self {
            ctx: PluginContext::new(settings, Arc::new(config), Arc::new(resources)),
            exceptions: Arc::new(exceptions),
            profile,
            registry,
            timings: Mutex::new(Vec::new()),
        }
    }

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    pub fn config(&self) -> &Config {
        &self.ctx.config
    }

    pub fn exceptions(&self) -> &Exceptions {
        &self.exceptions
    }

    /// Timings recorded so far, in completion order.
    pub fn timings(&self) -> Vec<Timing> {
        self.timings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Level for `package`: override, then settings, then profile.
    pub fn get_level(&self, package: &Package, level_override: Option<&str>) -> String {
        level_override
            .or(self.ctx.settings.level.as_deref())
            .map(String::from)
            .or_else(|| {
                self.profile
                    .as_ref()
                    .map(|p| p.get_package_level(package).to_string())
            })
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
    }

    /// Scan the package rooted at `path`.
    pub fn run(&self, path: &Path, level_override: Option<&str>) -> Result<ScanResult, RunError> {
        let path = fs::canonicalize(path).map_err(|_| RunError::PackageNotFound(path.to_path_buf()))?;
        let mut package = Package::from_path(&path);
        let level = self.get_level(&package, level_override);
        if !self.ctx.config.has_level(&level) {
            return Err(RunError::UnknownLevel(level));
        }

        let mut result = ScanResult {
            package: package.name.clone(),
            level: level.clone(),
            success: true,
            ..ScanResult::default()
        };
        if self.exceptions.is_ignored(&package) {
            info!("Package {} is configured to be ignored.", package.name);
            return Ok(result);
        }

        self.prepare_output_dir(&package, &level)?;
        info!(
            "Scanning package {} ({}) at level {}",
            package.name,
            package.path.display(),
            level
        );

        self.run_discovery(&mut package, &level)?;
        let issues = self.run_tools(&package, &level, &mut result.success)?;
        result.issues = self.exceptions.filter_issues(&package, issues);
        self.run_reporting(&package, &level, &mut result);
        Ok(result)
    }

    fn prepare_output_dir(&self, package: &Package, level: &str) -> Result<(), RunError> {
        let Some(root) = self.ctx.settings.output_directory.as_ref() else {
            return Ok(());
        };
        if !root.is_dir() {
            return Err(RunError::OutputDirectory(root.clone()));
        }
        if let Some(dir) = self.ctx.settings.package_output_dir(&package.name, level) {
            fs::create_dir_all(&dir).map_err(|source| RunError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            info!("Writing output to: {}", dir.display());
        }
        Ok(())
    }

    fn run_discovery(&self, package: &mut Package, level: &str) -> Result<(), RunError> {
        let mut enabled = self.ctx.config.get_enabled_discovery_plugins(level)?;
        if enabled.is_empty() {
            enabled = self.registry.discovery_names();
        }
        let order = dependency_order(&enabled, true, |name| {
            self.registry
                .discovery(name)
                .map(|p| p.dependencies())
                .ok_or_else(|| unknown("discovery", name))
        })?;
        for name in order {
            let plugin = self
                .registry
                .discovery(&name)
                .ok_or_else(|| unknown("discovery", &name))?;
            info!("Running {} discovery plugin...", name);
            let start = Instant::now();
            plugin.scan(&self.ctx, package, level, Some(&self.exceptions));
            self.record(&package.name, &name, PluginType::Discovery, start.elapsed());
            debug!("{} discovery plugin done.", name);
        }
        Ok(())
    }

    fn run_tools(
        &self,
        package: &Package,
        level: &str,
        success: &mut bool,
    ) -> Result<IssueMap, RunError> {
        let enabled = self.ctx.config.get_enabled_tool_plugins(level)?;
        let deps = |name: &str| {
            self.registry
                .tool(name)
                .map(|p| p.dependencies())
                .ok_or_else(|| unknown("tool", name))
        };
        let mut order = dependency_order(&enabled, false, deps)?;
        if let Some(forced) = self.ctx.settings.force_tool_list.as_ref() {
            let keep = forced_closure(forced, deps);
            order.retain(|name| {
                let kept = keep.contains(name);
                if !kept {
                    info!("Skipping plugin not in force list {}!", name);
                }
                kept
            });
        }

        let mut issues = IssueMap::new();
        for name in order {
            let plugin = self.registry.tool(&name).ok_or_else(|| unknown("tool", &name))?;
            info!("Running {} tool plugin...", name);
            let start = Instant::now();
            let outcome = plugin.scan(&self.ctx, package, level);
            self.record(&package.name, &name, PluginType::Tool, start.elapsed());
            match outcome {
                Ok(found) => {
                    debug!("{} tool plugin done.", name);
                    issues.insert(name, found);
                }
                Err(e) => {
                    warn!("{} tool plugin failed: {}", name, e);
                    *success = false;
                }
            }
        }
        Ok(issues)
    }

    fn run_reporting(&self, package: &Package, level: &str, result: &mut ScanResult) {
        let enabled = match self.ctx.config.get_enabled_reporting_plugins(level) {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!("unable to resolve reporting plugins: {}", e);
                result.success = false;
                return;
            }
        };
        if enabled.is_empty() {
            warn!("No reporting plugins enabled for level {}", level);
            result.success = false;
            return;
        }
        for name in enabled {
            let Some(plugin) = self.registry.reporting(&name) else {
                warn!("Can't find specified reporting plugin {}!", name);
                result.success = false;
                continue;
            };
            let start = Instant::now();
            let outcome = plugin.report(&self.ctx, package, &result.issues, level);
            self.record(&package.name, &name, PluginType::Reporting, start.elapsed());
            match outcome {
                Ok(Some(summary)) => {
                    result.reports.insert(name, summary);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("{} reporting plugin failed: {}", name, e);
                    result.success = false;
                }
            }
        }
    }

    fn record(&self, package: &str, name: &str, plugin_type: PluginType, duration: Duration) {
        let timing = Timing {
            package: package.to_string(),
            name: name.to_string(),
            plugin_type: plugin_type.to_string(),
            duration,
        };
        self.timings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(timing);
    }

    /// Scan every package below `root`, in parallel.
    ///
    /// Ignored packages are skipped. Each package's failure is reported in
    /// its own outcome and never aborts the others.
    pub fn run_workspace(&self, root: &Path) -> Result<Vec<PackageOutcome>, RunError> {
        if !root.is_dir() {
            return Err(RunError::PackageNotFound(root.to_path_buf()));
        }
        let ignored: HashSet<&str> = self
            .exceptions
            .get_ignore_packages()
            .iter()
            .map(String::as_str)
            .collect();
        let packages: Vec<PathBuf> = find_packages(root)
            .into_iter()
            .filter(|p| {
                let name = p.file_name().map(|n| n.to_string_lossy().to_string());
                let skip = name.as_deref().is_some_and(|n| ignored.contains(n));
                if skip {
                    info!("Package {} is configured to be ignored.", p.display());
                }
                !skip
            })
            .collect();
        info!("Found {} packages under {}", packages.len(), root.display());

        let scan_all = || {
            packages
                .par_iter()
                .map(|path| PackageOutcome {
                    path: path.clone(),
                    result: self.run(path, None),
                })
                .collect::<Vec<_>>()
        };
        let outcomes = match self.ctx.settings.max_procs {
            Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(scan_all),
                Err(e) => {
                    warn!("unable to build a pool of {} workers: {}", n, e);
                    scan_all()
                }
            },
            None => scan_all(),
        };
        Ok(outcomes)
    }
}

fn unknown(kind: &'static str, name: &str) -> RunError {
    RunError::UnknownPlugin {
        kind,
        name: name.to_string(),
    }
}

/// Forced tools plus everything they transitively depend on.
fn forced_closure<F>(forced: &[String], deps: F) -> HashSet<String>
where
    F: Fn(&str) -> Result<Vec<String>, RunError>,
{
    let mut keep = HashSet::new();
    let mut stack: Vec<String> = forced.to_vec();
    while let Some(name) = stack.pop() {
        if !keep.insert(name.clone()) {
            continue;
        }
        // Forced names that are not registered simply never match.
        if let Ok(children) = deps(&name) {
            stack.extend(children);
        }
    }
    keep
}

/// Directories below `root` holding a package marker, sorted. The search
/// does not descend into hidden directories or into found packages.
pub fn find_packages(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            walker.skip_current_dir();
            continue;
        }
        if PACKAGE_MARKERS.iter().any(|m| entry.path().join(m).is_file()) {
            found.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    found
}

/// Base config from the resource chain, user config from the explicit
/// setting or the first user path that carries one.
pub fn load_config(settings: &Effective, resources: &Resources) -> Result<Config, RunError> {
    let base = resources.resolve(&settings.config);
    let user = match settings.user_config.as_deref() {
        Some(name) => resources.resolve(name),
        None => resources.get_user_file(&settings.config),
    };
    let user = user.filter(|u| Some(u) != base.as_ref());
    Ok(Config::new(base.as_deref(), user.as_deref(), DEFAULT_LEVEL)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::models::Issue;
    use crate::plugins::{DiscoveryPlugin, ReportingPlugin, ToolPlugin};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    const TXT: &str = "txt_src";

    struct TxtDiscovery;

    impl DiscoveryPlugin for TxtDiscovery {
        fn name(&self) -> &'static str {
            "txt"
        }

        fn scan(
            &self,
            _ctx: &PluginContext,
            package: &mut Package,
            _level: &str,
            exceptions: Option<&Exceptions>,
        ) {
            crate::plugins::discovery::collect_files(package, exceptions, TXT, "text", |f| {
                f.name.ends_with(".txt")
            });
        }
    }

    /// Reports one issue on line 1 of every text file.
    struct LineOneTool {
        name: &'static str,
        deps: Vec<String>,
        fail: bool,
    }

    impl ToolPlugin for LineOneTool {
        fn name(&self) -> &'static str {
            self.name
        }

        fn dependencies(&self) -> Vec<String> {
            self.deps.clone()
        }

        fn file_types(&self) -> &'static [&'static str] {
            &[TXT]
        }

        fn process_files(
            &self,
            _ctx: &PluginContext,
            _package: &Package,
            _level: &str,
            files: &[PathBuf],
            _user_flags: &[String],
        ) -> Result<Vec<String>, ToolError> {
            if self.fail {
                return Err(ToolError::ExitCode {
                    tool: self.name.to_string(),
                    code: 2,
                });
            }
            Ok(files.iter().map(|f| f.to_string_lossy().to_string()).collect())
        }

        fn parse_output(
            &self,
            _ctx: &PluginContext,
            output: &[String],
            _package: &Package,
        ) -> Result<Vec<Issue>, ToolError> {
            Ok(output
                .iter()
                .map(|f| Issue::new(f, 1, self.name, "T1", 3, "first line", None))
                .collect())
        }
    }

    struct CountingReporter(Arc<AtomicUsize>);

    impl ReportingPlugin for CountingReporter {
        fn name(&self) -> &'static str {
            "count"
        }

        fn report(
            &self,
            _ctx: &PluginContext,
            _package: &Package,
            issues: &IssueMap,
            _level: &str,
        ) -> Result<Option<Json>, crate::error::ReportError> {
            let n: usize = issues.values().map(Vec::len).sum();
            self.0.fetch_add(n, Ordering::SeqCst);
            Ok(Some(serde_json::json!({ "issues": n })))
        }
    }

    fn tool(name: &'static str, deps: &[&str]) -> Box<LineOneTool> {
        Box::new(LineOneTool {
            name,
            deps: deps.iter().map(|d| d.to_string()).collect(),
            fail: false,
        })
    }

    fn registry(counter: Arc<AtomicUsize>) -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register_discovery(Box::new(TxtDiscovery));
        registry.register_tool(tool("alpha", &[]));
        registry.register_tool(tool("beta", &["alpha"]));
        registry.register_tool(Box::new(LineOneTool {
            name: "broken",
            deps: Vec::new(),
            fail: true,
        }));
        registry.register_reporting(Box::new(CountingReporter(counter)));
        registry
    }

    const CONFIG: &str = r#"
levels:
  basic:
    tool:
      alpha:
    reporting:
      count:
  chained:
    inherits_from: basic
    tool:
      beta:
  orphan:
    tool:
      beta:
    reporting:
      count:
  failing:
    inherits_from: basic
    tool:
      broken:
  silent:
    tool:
      alpha:
"#;

    fn runner(settings: Effective, exceptions: &str, counter: Arc<AtomicUsize>) -> Runner {
        Runner::from_parts(
            settings,
            Config::from_yaml(CONFIG).unwrap(),
            Exceptions::from_yaml(exceptions).unwrap(),
            Some(Profile::from_yaml("default: basic\npackages:\n  special: chained\n").unwrap()),
            Resources::new(&[]),
            registry(counter),
        )
    }

    fn package_dir(name: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let pkg = dir.path().join(name);
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("a.txt"), "hello\n").unwrap();
        fs::write(pkg.join("sub/b.txt"), "quiet  # NOLINT\n").unwrap();
        (dir, pkg)
    }

    #[test]
    fn test_run_uses_profile_and_filters_nolint() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("plain");
        let r = runner(Effective::default(), "ignore_packages:\n", counter.clone());
        let result = r.run(&pkg, None).unwrap();
        assert_eq!(result.level, "basic");
        assert!(result.success);
        assert_eq!(result.issues["alpha"].len(), 1);
        assert!(result.issues["alpha"][0].filename.ends_with("a.txt"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(result.reports["count"]["issues"], 1);
    }

    #[test]
    fn test_dependencies_run_first() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("special");
        let r = runner(Effective::default(), "ignore_packages:\n", counter);
        let result = r.run(&pkg, None).unwrap();
        assert_eq!(result.level, "chained");
        let tools: Vec<_> = r
            .timings()
            .into_iter()
            .filter(|t| t.plugin_type == "tool")
            .map(|t| t.name)
            .collect();
        assert_eq!(tools, vec!["alpha", "beta"]);
        assert_eq!(result.issues.len(), 2);
    }

    #[test]
    fn test_missing_dependency_is_error() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("p");
        let r = runner(Effective::default(), "ignore_packages:\n", counter);
        let err = r.run(&pkg, Some("orphan")).unwrap_err();
        assert!(matches!(err, RunError::MissingDependency { .. }));
    }

    #[test]
    fn test_failed_tool_is_absent_and_unsuccessful() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("p");
        let r = runner(Effective::default(), "ignore_packages:\n", counter);
        let result = r.run(&pkg, Some("failing")).unwrap();
        assert!(!result.success);
        assert!(result.issues.contains_key("alpha"));
        assert!(!result.issues.contains_key("broken"));
    }

    #[test]
    fn test_force_tool_list_keeps_dependencies() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("special");
        let settings = Effective {
            force_tool_list: Some(vec!["beta".into()]),
            ..Effective::default()
        };
        let r = runner(settings, "ignore_packages:\n", counter.clone());
        let result = r.run(&pkg, None).unwrap();
        assert_eq!(result.issues.len(), 2);

        let settings = Effective {
            force_tool_list: Some(vec!["alpha".into()]),
            ..Effective::default()
        };
        let r = runner(settings, "ignore_packages:\n", counter);
        let result = r.run(&pkg, None).unwrap();
        assert_eq!(result.issues.keys().collect::<Vec<_>>(), vec!["alpha"]);
    }

    #[test]
    fn test_unknown_level_and_missing_path() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (dir, pkg) = package_dir("p");
        let r = runner(Effective::default(), "ignore_packages:\n", counter);
        assert!(matches!(r.run(&pkg, Some("nope")), Err(RunError::UnknownLevel(_))));
        assert!(matches!(
            r.run(&dir.path().join("missing"), None),
            Err(RunError::PackageNotFound(_))
        ));
    }

    #[test]
    fn test_ignored_package_is_empty_success() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("skip_me");
        let r = runner(Effective::default(), "ignore_packages: [skip_me]\n", counter.clone());
        let result = r.run(&pkg, None).unwrap();
        assert!(result.success);
        assert!(result.issues.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_reporting_plugins_is_unsuccessful() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("p");
        let r = runner(Effective::default(), "ignore_packages:\n", counter);
        let result = r.run(&pkg, Some("silent")).unwrap();
        assert!(!result.success);
        assert_eq!(result.issues["alpha"].len(), 1);
    }

    #[test]
    fn test_output_directory_per_package() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (dir, pkg) = package_dir("p");
        let out = dir.path().join("out");
        let settings = Effective {
            output_directory: Some(out.clone()),
            ..Effective::default()
        };
        let r = runner(settings, "ignore_packages:\n", counter.clone());
        assert!(matches!(r.run(&pkg, None), Err(RunError::OutputDirectory(_))));

        fs::create_dir_all(&out).unwrap();
        r.run(&pkg, None).unwrap();
        assert!(out.join("p-basic").is_dir());
        assert!(out.join("p-basic/alpha.log").is_file());
    }

    #[test]
    fn test_exceptions_apply_early_and_late() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (_dir, pkg) = package_dir("p");
        let r = runner(
            Effective::default(),
            "global:\n  exceptions:\n    message_regex:\n      - tools: [alpha]\n        regex: first\n",
            counter,
        );
        let result = r.run(&pkg, None).unwrap();
        assert!(result.issues["alpha"].is_empty());
    }

    #[test]
    fn test_workspace_scans_each_package() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ws = tempdir().unwrap();
        for name in ["one", "two", "skip_me"] {
            let pkg = ws.path().join("src").join(name);
            fs::create_dir_all(&pkg).unwrap();
            fs::write(pkg.join("setup.py"), "").unwrap();
            fs::write(pkg.join("readme.txt"), "x\n").unwrap();
        }
        fs::create_dir_all(ws.path().join(".hidden/pkg")).unwrap();
        fs::write(ws.path().join(".hidden/pkg/setup.py"), "").unwrap();

        let settings = Effective {
            max_procs: Some(2),
            ..Effective::default()
        };
        let r = runner(settings, "ignore_packages: [skip_me]\n", counter.clone());
        let outcomes = r.run_workspace(ws.path()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.as_ref().is_ok_and(|r| r.success)));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_find_packages_stops_at_package_roots() {
        let ws = tempdir().unwrap();
        fs::create_dir_all(ws.path().join("a/nested")).unwrap();
        fs::write(ws.path().join("a/package.xml"), "").unwrap();
        fs::write(ws.path().join("a/nested/setup.py"), "").unwrap();
        fs::create_dir_all(ws.path().join("b")).unwrap();
        fs::write(ws.path().join("b/Cargo.toml"), "").unwrap();
        let found = find_packages(ws.path());
        assert_eq!(found, vec![ws.path().join("a"), ws.path().join("b")]);
    }
}
