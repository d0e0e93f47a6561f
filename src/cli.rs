//! CLI argument parsing via `clap`.

use crate::settings::{split_list, CliOverrides};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lintherd",
    version,
    about = "Run a herd of linters over a package",
    long_about = "lintherd discovers source files in a package, runs the linters enabled for the package's level, filters the findings through exceptions and reports them.\n\nConfiguration precedence: CLI > lintherd.toml > defaults.",
    after_help = "Examples:\n  lintherd scan .\n  lintherd scan src/my_pkg --level strict --output-directory out\n  lintherd scan ws --workspace --max-procs 4\n  lintherd levels --config my-config.yaml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current lintherd version.")]
    Version,
    /// Scan a package or a workspace of packages
    #[command(
        about = "Scan a package",
        long_about = "Discover files, run the tools enabled for the level and report the filtered issues. With --workspace every package below the path is scanned in parallel.",
        after_help = "Examples:\n  lintherd scan . --check\n  lintherd scan . --force-tool-list pylint,mypy --timings"
    )]
    Scan(ScanArgs),
    /// List levels and the plugins they enable
    #[command(
        about = "List levels",
        long_about = "Print every level in the config with its resolved discovery, tool and reporting plugins."
    )]
    Levels {
        #[arg(long, help = "Config file name or path (default: config.yaml)")]
        config: Option<String>,
        #[arg(long, help = "User config merged over the base config")]
        user_config: Option<String>,
        #[arg(long, value_delimiter = ',', help = "Extra resource directories, comma separated")]
        user_paths: Option<Vec<String>>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ScanArgs {
    #[arg(help = "Package (or workspace) root")]
    pub path: String,
    #[arg(long, help = "Directory that receives per-package logs and reports")]
    pub output_directory: Option<String>,
    #[arg(long, help = "Profile file name or path (default: profile.yaml)")]
    pub profile: Option<String>,
    #[arg(long, help = "Config file name or path (default: config.yaml)")]
    pub config: Option<String>,
    #[arg(long, help = "User config merged over the base config")]
    pub user_config: Option<String>,
    #[arg(long, help = "Exceptions file name or path (default: exceptions.yaml)")]
    pub exceptions: Option<String>,
    #[arg(long, help = "Scan level; overrides the profile")]
    pub level: Option<String>,
    #[arg(long, help = "Extra resource directories, comma separated")]
    pub user_paths: Option<String>,
    #[arg(long, help = "Only run these tools (and their dependencies), comma separated")]
    pub force_tool_list: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Scan every package below the path")]
    pub workspace: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero on issues or failed plugins")]
    pub check: bool,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Print per-plugin timings")]
    pub timings: bool,
    #[arg(long, help = "Log filter, e.g. info or lintherd=debug (default: RUST_LOG, then warn)")]
    pub log_level: Option<String>,
    #[arg(long, help = "Worker threads for tools and workspace scans")]
    pub max_procs: Option<usize>,
    #[arg(long, help = "Suffix selecting alternate plugin mapping files")]
    pub mapping_file_suffix: Option<String>,
}

impl ScanArgs {
    /// Flags as settings overrides; unset switches defer to the settings file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root: Some(self.path.clone()),
            profile: self.profile.clone(),
            config: self.config.clone(),
            user_config: self.user_config.clone(),
            exceptions: self.exceptions.clone(),
            output_directory: self.output_directory.clone(),
            level: self.level.clone(),
            user_paths: self.user_paths.as_deref().map(split_list),
            log_level: self.log_level.clone(),
            max_procs: self.max_procs,
            mapping_file_suffix: self.mapping_file_suffix.clone(),
            check: self.check.then_some(true),
            timings: self.timings.then_some(true),
            force_tool_list: self.force_tool_list.as_deref().map(split_list),
        }
    }
}
