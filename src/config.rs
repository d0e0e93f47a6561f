//! Level resolution engine.
//!
//! A level names the discovery, tool, and reporting plugins to run and the
//! per-plugin settings (usually `flags`) to run them with. Levels may inherit
//! from any number of parent levels:
//! - Enabled plugins are the level's own plugins, then each parent's in
//!   `inherits_from` order; the first occurrence of a name wins.
//! - A setting found directly on the level is returned as-is. Otherwise the
//!   values resolved from every parent are concatenated in order.
//!
//! The level named by `default_level` is the recursion's base case and never
//! enables any plugin. A user document may add levels or replace base levels
//! wholesale.

use crate::error::ConfigError;
use crate::models::level::{Level, LevelDocument, OrderedTable, PluginType};
use serde_yaml::Value as Yaml;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_LEVEL: &str = "default";

#[derive(Debug, Clone)]
pub struct Config {
    levels: OrderedTable<Level>,
    default_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            levels: OrderedTable::default(),
            default_level: DEFAULT_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Load the base document and merge an optional user document over it.
    ///
    /// A missing base file yields a config without levels. A missing user
    /// file is ignored. Either file failing to parse is an error.
    pub fn new(
        base_file: Option<&Path>,
        user_file: Option<&Path>,
        default_level: &str,
    ) -> Result<Self, ConfigError> {
        let mut config = Config {
            default_level: default_level.to_string(),
            ..Config::default()
        };
        let base_file = match base_file {
            Some(p) if p.exists() => p,
            _ => return Ok(config),
        };
        config.levels = read_document(base_file)?;
        if let Some(user_file) = user_file.filter(|p| p.exists()) {
            let user = read_document(user_file)?;
            config.merge_user_levels(user);
        }
        Ok(config)
    }

    /// Build a config from an in-memory base document.
    pub fn from_yaml(base: &str) -> Result<Self, ConfigError> {
        Ok(Config {
            levels: parse_document(base, Path::new("<memory>"))?,
            ..Config::default()
        })
    }

    /// Merge an in-memory user document over the loaded levels.
    pub fn with_user_yaml(mut self, user: &str) -> Result<Self, ConfigError> {
        let user = parse_document(user, Path::new("<memory>"))?;
        self.merge_user_levels(user);
        Ok(self)
    }

    /// User levels replace base levels of the same name. A user level that
    /// inherits only from itself is treated as inheriting from nothing.
    fn merge_user_levels(&mut self, user: OrderedTable<Level>) {
        for (name, mut level) in user.0 {
            if level.inherits_from.len() == 1 && level.inherits_from[0] == name {
                level.inherits_from.clear();
            }
            debug!("user level {} overrides base definition", name);
            self.levels.insert(name, level);
        }
    }

    pub fn has_level(&self, level: &str) -> bool {
        self.levels.get(level).is_some()
    }

    /// Level names in document order.
    pub fn levels(&self) -> impl Iterator<Item = &str> {
        self.levels.keys()
    }

    /// Plugins of `plugin_type` enabled for `level`, including inherited ones.
    ///
    /// Requesting a level that is not defined is an error; callers taking a
    /// level from user input should check `has_level` first.
    pub fn get_enabled_plugins(
        &self,
        level: &str,
        plugin_type: PluginType,
    ) -> Result<Vec<String>, ConfigError> {
        let mut visiting = Vec::new();
        self.enabled_plugins(level, plugin_type, &mut visiting)
    }

    fn enabled_plugins(
        &self,
        level: &str,
        plugin_type: PluginType,
        visiting: &mut Vec<String>,
    ) -> Result<Vec<String>, ConfigError> {
        let mut plugins: Vec<String> = Vec::new();
        if level == self.default_level {
            return Ok(plugins);
        }
        let level_config = self
            .levels
            .get(level)
            .ok_or_else(|| ConfigError::UnknownLevel(level.to_string()))?;
        enter(visiting, level)?;

        if let Some(table) = level_config.plugins(plugin_type) {
            for name in table.names() {
                if !plugins.iter().any(|p| p == name) {
                    plugins.push(name.to_string());
                }
            }
        }
        for parent in level_config.inherits_from.iter().filter(|p| *p != level) {
            for plugin in self.enabled_plugins(parent, plugin_type, visiting)? {
                if !plugins.contains(&plugin) {
                    plugins.push(plugin);
                }
            }
        }

        visiting.pop();
        Ok(plugins)
    }

    pub fn get_enabled_discovery_plugins(&self, level: &str) -> Result<Vec<String>, ConfigError> {
        self.get_enabled_plugins(level, PluginType::Discovery)
    }

    pub fn get_enabled_tool_plugins(&self, level: &str) -> Result<Vec<String>, ConfigError> {
        self.get_enabled_plugins(level, PluginType::Tool)
    }

    pub fn get_enabled_reporting_plugins(&self, level: &str) -> Result<Vec<String>, ConfigError> {
        self.get_enabled_plugins(level, PluginType::Reporting)
    }

    /// Setting `key` of `plugin` at `level`, or `default` when neither the
    /// level nor any ancestor defines it.
    ///
    /// An undefined level resolves to `default`.
    pub fn get_plugin_config(
        &self,
        plugin_type: PluginType,
        plugin: &str,
        level: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        let mut visiting = Vec::new();
        let found = self.plugin_config(plugin_type, plugin, level, key, &mut visiting)?;
        Ok(found.or_else(|| default.map(String::from)))
    }

    fn plugin_config(
        &self,
        plugin_type: PluginType,
        plugin: &str,
        level: &str,
        key: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Option<String>, ConfigError> {
        let Some(level_config) = self.levels.get(level) else {
            return Ok(None);
        };
        let direct = level_config
            .plugins(plugin_type)
            .and_then(|t| t.settings(plugin))
            .and_then(|s| s.get(key))
            .and_then(render_scalar);
        if direct.is_some() {
            return Ok(direct);
        }

        enter(visiting, level)?;
        let mut configs = String::new();
        for parent in level_config.inherits_from.iter().filter(|p| *p != level) {
            if let Some(value) = self.plugin_config(plugin_type, plugin, parent, key, visiting)? {
                configs.push_str(&value);
            }
        }
        visiting.pop();

        Ok(if configs.is_empty() { None } else { Some(configs) })
    }

    /// Tool setting flattened to a single line: whitespace runs collapse to
    /// one space and surrounding double quotes are stripped.
    pub fn get_tool_config(
        &self,
        plugin: &str,
        level: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        let flags = self.get_plugin_config(PluginType::Tool, plugin, level, key, default)?;
        Ok(flags.map(|f| normalize_flags(&f)))
    }

    pub fn get_discovery_config(
        &self,
        plugin: &str,
        level: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        self.get_plugin_config(PluginType::Discovery, plugin, level, key, default)
    }

    pub fn get_reporting_config(
        &self,
        plugin: &str,
        level: &str,
        key: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ConfigError> {
        self.get_plugin_config(PluginType::Reporting, plugin, level, key, default)
    }

    /// Interpret a setting as a boolean switch.
    pub fn str_to_bool(value: Option<&str>) -> bool {
        match value {
            Some(v) => matches!(
                v.to_lowercase().as_str(),
                "y" | "yes" | "t" | "true" | "on" | "1"
            ),
            None => false,
        }
    }
}

fn enter(visiting: &mut Vec<String>, level: &str) -> Result<(), ConfigError> {
    if visiting.iter().any(|l| l == level) {
        let mut chain = visiting.clone();
        chain.push(level.to_string());
        return Err(ConfigError::InheritanceCycle { chain });
    }
    visiting.push(level.to_string());
    Ok(())
}

fn render_scalar(value: &Yaml) -> Option<String> {
    match value {
        Yaml::Null => None,
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        other => serde_yaml::to_string(other).ok().map(|s| s.trim_end().to_string()),
    }
}

fn normalize_flags(flags: &str) -> String {
    let joined = flags.split_whitespace().collect::<Vec<_>>().join(" ");
    joined.trim_matches('"').trim().to_string()
}

fn read_document(path: &Path) -> Result<OrderedTable<Level>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text, path)
}

fn parse_document(text: &str, path: &Path) -> Result<OrderedTable<Level>, ConfigError> {
    let yaml_err = |source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    };
    let value: Yaml = serde_yaml::from_str(text).map_err(yaml_err)?;
    if value.is_null() {
        return Ok(OrderedTable::default());
    }
    let doc: LevelDocument = serde_yaml::from_value(value).map_err(yaml_err)?;
    Ok(OrderedTable(
        doc.levels
            .0
            .into_iter()
            .map(|(name, level)| (name, level.unwrap_or_default()))
            .collect(),
    ))
}
