//! lintherd CLI binary entry point.
//! Resolves settings, runs scans through the library and maps results to
//! exit codes.

use clap::Parser;
use lintherd::cli::{Cli, Commands, ScanArgs};
use lintherd::models::level::PluginType;
use lintherd::plugins::PluginRegistry;
use lintherd::resources::Resources;
use lintherd::scan::{self, Runner, ScanResult, Timing};
use lintherd::settings::{self, CliOverrides};
use lintherd::{logging, utils};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Levels {
            config,
            user_config,
            user_paths,
        } => {
            let eff = settings::resolve_effective(&CliOverrides {
                config,
                user_config,
                user_paths,
                ..CliOverrides::default()
            });
            logging::init(eff.log_level.as_deref());
            let resources = Resources::new(&eff.user_paths);
            match scan::load_config(&eff, &resources) {
                Ok(config) => print_levels(&config),
                Err(e) => fail(&e),
            }
        }
        Commands::Scan(args) => std::process::exit(run_scan(&args)),
    }
}

fn run_scan(args: &ScanArgs) -> i32 {
    let eff = settings::resolve_effective(&args.overrides());
    logging::init(eff.log_level.as_deref());
    if !eff.settings_found {
        eprintln!(
            "{} No lintherd.toml found; using defaults.",
            utils::note_prefix()
        );
    }
    let check = eff.check;
    let show_timings = eff.timings;
    let runner = match Runner::new(eff, PluginRegistry::builtin()) {
        Ok(r) => r,
        Err(e) => fail(&e),
    };

    let path = Path::new(&args.path);
    let results: Vec<ScanResult> = if args.workspace {
        let outcomes = match runner.run_workspace(path) {
            Ok(o) => o,
            Err(e) => fail(&e),
        };
        let mut results = Vec::new();
        let mut errored = false;
        for outcome in outcomes {
            match outcome.result {
                Ok(r) => results.push(r),
                Err(e) => {
                    errored = true;
                    eprintln!(
                        "{} {}: {}",
                        utils::error_prefix(),
                        outcome.path.display(),
                        e
                    );
                }
            }
        }
        eprintln!(
            "{} Scanned {} packages.",
            utils::info_prefix(),
            results.len()
        );
        if errored {
            return 2;
        }
        results
    } else {
        match runner.run(path, None) {
            Ok(r) => vec![r],
            Err(e) => fail(&e),
        }
    };

    if show_timings {
        print_timings(&runner.timings());
    }
    let clean = results.iter().all(|r| r.success && r.issue_count() == 0);
    if check && !clean {
        return 1;
    }
    0
}

fn fail(e: &dyn std::fmt::Display) -> ! {
    eprintln!("{} {}", utils::error_prefix(), e);
    std::process::exit(2);
}

fn print_levels(config: &lintherd::config::Config) {
    for level in config.levels() {
        println!("{}", level);
        for plugin_type in [PluginType::Discovery, PluginType::Tool, PluginType::Reporting] {
            match config.get_enabled_plugins(level, plugin_type) {
                Ok(plugins) => println!("  {}: {}", plugin_type, plugins.join(", ")),
                Err(e) => println!("  {}: {}", plugin_type, e),
            }
        }
    }
}

fn print_timings(timings: &[Timing]) {
    let mut rows: Vec<&Timing> = timings.iter().collect();
    // Stable: plugins keep run order within a package.
    rows.sort_by(|a, b| a.package.cmp(&b.package));
    println!("{:<24} {:<10} {:<24} {:>10}", "package", "type", "plugin", "seconds");
    for t in rows {
        println!(
            "{:<24} {:<10} {:<24} {:>10.3}",
            t.package,
            t.plugin_type,
            t.name,
            t.duration.as_secs_f64()
        );
    }
}
