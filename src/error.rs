//! Typed errors for document loading, plugin execution, and orchestration.
//!
//! Construction-time errors always name the offending file so the binary can
//! abort with a message the user can act on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or resolving the level document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid YAML file: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("level '{0}' is not defined")]
    UnknownLevel(String),

    #[error("inheritance cycle between levels: {}", chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },
}

/// Errors raised while loading a profile document.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid YAML file: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} is empty, can't continue", .0.display())]
    Empty(PathBuf),

    #[error("no 'default' key found in {}", .0.display())]
    MissingDefault(PathBuf),
}

/// Errors raised while loading an exceptions document.
#[derive(Debug, Error)]
pub enum ExceptionsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid exceptions file: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} is empty, can't continue", .0.display())]
    Empty(PathBuf),
}

/// Failure of a single tool plugin. The tool's results are treated as
/// unavailable for the package, never as a clean run.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("couldn't find {binary} executable: {source}")]
    MissingBinary {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} failed with exit code {code}")]
    ExitCode { tool: String, code: i32 },

    #[error("{tool} terminated by signal")]
    Signal { tool: String },

    #[error("unable to parse {tool} output: {message}")]
    Output { tool: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure of a reporting plugin.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unable to write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that abort a package scan.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no package found at {}", .0.display())]
    PackageNotFound(PathBuf),

    #[error("can't find specified level {0} in config")]
    UnknownLevel(String),

    #[error("can't find specified {kind} plugin {name}")]
    UnknownPlugin { kind: &'static str, name: String },

    #[error("plugin {plugin} depends on plugin {dependency} which isn't enabled")]
    MissingDependency { plugin: String, dependency: String },

    #[error("dependency cycle between plugins: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },

    #[error("output directory not found at {}", .0.display())]
    OutputDirectory(PathBuf),

    #[error("unable to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Exceptions(#[from] ExceptionsError),
}
