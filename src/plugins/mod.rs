//! Plugin contracts and the built-in plugin registry.
//!
//! Three capability traits cover the pipeline stages:
//! - [`DiscoveryPlugin`]: finds files of one kind and records them on the
//!   package under a tag.
//! - [`ToolPlugin`]: runs one external analyzer over tagged files and turns
//!   its output into issues.
//! - [`ReportingPlugin`]: emits the filtered issue set.
//!
//! Plugins are selected by name at runtime through [`PluginRegistry`]. The
//! level engine only ever sees plugin names; plugins see the run settings,
//! the level engine and the resource chain through [`PluginContext`].

pub mod discovery;
pub mod reporting;
pub mod tool;

use crate::config::Config;
use crate::error::{ReportError, RunError, ToolError};
use crate::exceptions::Exceptions;
use crate::models::{Issue, IssueMap, Package};
use crate::resources::Resources;
use crate::settings::Effective;
use serde_json::Value as Json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
/// Read-only state shared with every plugin call.
pub struct PluginContext {
    pub settings: Effective,
    pub config: Arc<Config>,
    pub resources: Arc<Resources>,
}

impl PluginContext {
    pub fn new(settings: Effective, config: Arc<Config>, resources: Arc<Resources>) -> Self {
        Self {
            settings,
            config,
            resources,
        }
    }
}

pub trait DiscoveryPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Discovery plugins that must run before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Record this plugin's files on `package`, dropping files excluded by
    /// `exceptions` when given.
    fn scan(
        &self,
        ctx: &PluginContext,
        package: &mut Package,
        level: &str,
        exceptions: Option<&Exceptions>,
    );
}

pub trait ToolPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tool plugins that must run before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Package tags whose files this tool consumes.
    fn file_types(&self) -> &'static [&'static str];

    /// Run the tool over `files` and return its raw output chunks.
    fn process_files(
        &self,
        ctx: &PluginContext,
        package: &Package,
        level: &str,
        files: &[PathBuf],
        user_flags: &[String],
    ) -> Result<Vec<String>, ToolError>;

    /// Turn raw output into issues. Output that cannot be understood at all
    /// is an error; individual unrecognised lines are skipped.
    fn parse_output(
        &self,
        ctx: &PluginContext,
        output: &[String],
        package: &Package,
    ) -> Result<Vec<Issue>, ToolError>;

    /// Gather files, run the tool, keep a log of its output and parse it.
    ///
    /// A package without matching files yields an empty, successful result.
    fn scan(
        &self,
        ctx: &PluginContext,
        package: &Package,
        level: &str,
    ) -> Result<Vec<Issue>, ToolError> {
        let files: Vec<PathBuf> = self
            .file_types()
            .iter()
            .flat_map(|tag| package.paths(tag).iter().cloned())
            .collect();
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let user_flags = user_flags(ctx, self.name(), level)?;
        let output = self.process_files(ctx, package, level, &files, &user_flags)?;
        if let Some(dir) = ctx.settings.package_output_dir(&package.name, level) {
            write_log(&dir.join(format!("{}.log", self.name())), &output);
        }
        self.parse_output(ctx, &output, package)
    }

    /// Warning id -> reference mapping from
    /// `plugin_mapping/<tool>[-<suffix>].txt`.
    fn load_mapping(&self, ctx: &PluginContext) -> HashMap<String, String> {
        load_mapping(ctx, self.name())
    }
}

pub trait ReportingPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Emit `issues`; `Ok` carries an optional machine-readable summary.
    fn report(
        &self,
        ctx: &PluginContext,
        package: &Package,
        issues: &IssueMap,
        level: &str,
    ) -> Result<Option<Json>, ReportError>;
}

#[derive(Default)]
/// Name -> implementation dispatch table for all three plugin kinds.
pub struct PluginRegistry {
    discovery: BTreeMap<String, Box<dyn DiscoveryPlugin>>,
    tool: BTreeMap<String, Box<dyn ToolPlugin>>,
    reporting: BTreeMap<String, Box<dyn ReportingPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every plugin shipped with lintherd.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_discovery(Box::new(discovery::python::PythonDiscoveryPlugin));
        registry.register_discovery(Box::new(discovery::shell::ShellDiscoveryPlugin));
        registry.register_discovery(Box::new(discovery::yaml::YamlDiscoveryPlugin));
        registry.register_discovery(Box::new(discovery::c::CDiscoveryPlugin));
        registry.register_discovery(Box::new(discovery::markdown::MarkdownDiscoveryPlugin));

        registry.register_tool(Box::new(tool::pylint::PylintToolPlugin));
        registry.register_tool(Box::new(tool::mypy::MypyToolPlugin));
        registry.register_tool(Box::new(tool::shellcheck::ShellcheckToolPlugin));
        registry.register_tool(Box::new(tool::yamllint::YamllintToolPlugin));
        registry.register_tool(Box::new(tool::markdownlint::MarkdownlintToolPlugin));

        registry.register_reporting(Box::new(
            reporting::print_to_console::PrintToConsoleReportingPlugin,
        ));
        registry.register_reporting(Box::new(reporting::json::JsonReportingPlugin));
        registry.register_reporting(Box::new(
            reporting::write_jenkins_warnings_ng::JenkinsWarningsNgReportingPlugin,
        ));
        registry.register_reporting(Box::new(reporting::do_nothing::DoNothingReportingPlugin));
        registry
    }

    pub fn register_discovery(&mut self, plugin: Box<dyn DiscoveryPlugin>) {
        self.discovery.insert(plugin.name().to_string(), plugin);
    }

    pub fn register_tool(&mut self, plugin: Box<dyn ToolPlugin>) {
        self.tool.insert(plugin.name().to_string(), plugin);
    }

    pub fn register_reporting(&mut self, plugin: Box<dyn ReportingPlugin>) {
        self.reporting.insert(plugin.name().to_string(), plugin);
    }

    pub fn discovery(&self, name: &str) -> Option<&dyn DiscoveryPlugin> {
        self.discovery.get(name).map(|p| p.as_ref())
    }

    pub fn tool(&self, name: &str) -> Option<&dyn ToolPlugin> {
        self.tool.get(name).map(|p| p.as_ref())
    }

    pub fn reporting(&self, name: &str) -> Option<&dyn ReportingPlugin> {
        self.reporting.get(name).map(|p| p.as_ref())
    }

    pub fn discovery_names(&self) -> Vec<String> {
        self.discovery.keys().cloned().collect()
    }

}

/// Order `names` so every plugin follows its dependencies.
///
/// With `pull_in`, dependencies missing from `names` are added; otherwise a
/// missing dependency is an error. `deps` fails for unknown plugins.
pub fn dependency_order<F>(names: &[String], pull_in: bool, deps: F) -> Result<Vec<String>, RunError>
where
    F: Fn(&str) -> Result<Vec<String>, RunError>,
{
    let enabled: HashSet<&str> = names.iter().map(String::as_str).collect();
    let mut state = OrderState {
        visiting: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    for name in names {
        visit(name, &enabled, pull_in, &deps, &mut state)?;
    }
    Ok(state.order)
}

struct OrderState {
    visiting: Vec<String>,
    done: HashSet<String>,
    order: Vec<String>,
}

fn visit<F>(
    name: &str,
    enabled: &HashSet<&str>,
    pull_in: bool,
    deps: &F,
    state: &mut OrderState,
) -> Result<(), RunError>
where
    F: Fn(&str) -> Result<Vec<String>, RunError>,
{
    if state.done.contains(name) {
        return Ok(());
    }
    if state.visiting.iter().any(|v| v == name) {
        let mut chain = state.visiting.clone();
        chain.push(name.to_string());
        return Err(RunError::DependencyCycle { chain });
    }
    state.visiting.push(name.to_string());
    for dep in deps(name)? {
        if !pull_in && !enabled.contains(dep.as_str()) {
            return Err(RunError::MissingDependency {
                plugin: name.to_string(),
                dependency: dep,
            });
        }
        visit(&dep, enabled, pull_in, deps, state)?;
    }
    state.visiting.pop();
    state.done.insert(name.to_string());
    state.order.push(name.to_string());
    Ok(())
}

/// Whether `bin` resolves to an executable file, either as a path or
/// through `PATH`.
pub fn command_exists(bin: &str) -> bool {
    let candidate = Path::new(bin);
    if candidate.components().count() > 1 {
        return is_executable(candidate);
    }
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| is_executable(&dir.join(bin)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// User flags for `tool` at `level`, split with POSIX shell quoting rules.
pub fn user_flags(ctx: &PluginContext, tool: &str, level: &str) -> Result<Vec<String>, ToolError> {
    let flags = ctx.config.get_tool_config(tool, level, "flags", None)?;
    Ok(flags.as_deref().map(split_flags).unwrap_or_default())
}

/// Split `input` into words: whitespace separates, single quotes are
/// literal, double quotes allow `\` escapes, a bare `\` escapes the next
/// character.
pub fn split_flags(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    word.push(q);
                }
            }
            '"' => {
                in_word = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(e @ ('"' | '\\' | '$' | '`')) => word.push(e),
                            Some(e) => {
                                word.push('\\');
                                word.push(e);
                            }
                            None => word.push('\\'),
                        },
                        _ => word.push(q),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(e) = chars.next() {
                    word.push(e);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            _ => {
                in_word = true;
                word.push(c);
            }
        }
    }
    if in_word {
        words.push(word);
    }
    words
}

/// Read `key:value` lines from the tool's mapping file, preferring the
/// suffixed variant when `mapping_file_suffix` is set and that file exists.
pub fn load_mapping(ctx: &PluginContext, tool: &str) -> HashMap<String, String> {
    let file_name = format!("plugin_mapping/{}.txt", tool);
    let suffixed = ctx
        .settings
        .mapping_file_suffix
        .as_ref()
        .and_then(|s| ctx.resources.get_file(&format!("plugin_mapping/{}-{}.txt", tool, s)));
    let Some(path) = suffixed.or_else(|| ctx.resources.get_file(&file_name)) else {
        return HashMap::new();
    };
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            warn!("unable to read mapping file {}: {}", path.display(), e);
            return HashMap::new();
        }
    };
    let mut mapping = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 {
            warn!("Invalid line {} in mapping file {}", line, file_name);
            continue;
        }
        mapping.insert(parts[0].to_string(), parts[1].to_string());
    }
    debug!("loaded {} mappings for {}", mapping.len(), tool);
    mapping
}

fn write_log(path: &Path, output: &[String]) {
    if let Err(e) = fs::write(path, output.concat()) {
        warn!("unable to write {}: {}", path.display(), e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::PluginContext;
    use crate::config::Config;
    use crate::resources::Resources;
    use crate::settings::Effective;
    use std::sync::Arc;

    pub fn context() -> PluginContext {
        PluginContext::new(
            Effective::default(),
            Arc::new(Config::default()),
            Arc::new(Resources::new(&[])),
        )
    }
}
