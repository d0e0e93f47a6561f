//! Built-in tool plugins and the subprocess helper they share.

pub mod markdownlint;
pub mod mypy;
pub mod pylint;
pub mod shellcheck;
pub mod yamllint;

use crate::error::ToolError;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr, as a single chunk.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        out.push_str(&self.stderr);
        out
    }
}

/// Run `binary args...` and accept the exit codes in `ok_codes`.
///
/// A binary that cannot be spawned, an exit code outside `ok_codes` and
/// termination by signal all fail the tool.
pub fn run_tool(
    tool: &str,
    binary: &str,
    args: &[String],
    ok_codes: &[i32],
) -> Result<ToolOutput, ToolError> {
    debug!("running {} {}", binary, args.join(" "));
    let out = Command::new(binary).args(args).output().map_err(|source| {
        warn!("Couldn't find {} executable! ({})", binary, source);
        ToolError::MissingBinary {
            binary: binary.to_string(),
            source,
        }
    })?;
    let output = ToolOutput {
        code: out.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&out.stdout).to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    };
    let Some(code) = out.status.code() else {
        warn!("{} terminated by signal", tool);
        return Err(ToolError::Signal {
            tool: tool.to_string(),
        });
    };
    if !ok_codes.contains(&code) {
        warn!("{} failed! Returncode = {}", tool, code);
        warn!("{} exception: {}", tool, output.combined());
        return Err(ToolError::ExitCode {
            tool: tool.to_string(),
            code,
        });
    }
    debug!("{}", output.combined());
    Ok(output)
}

/// Built-in flags, then user flags, then files.
pub fn command_args(flags: &[&str], user_flags: &[String], files: &[PathBuf]) -> Vec<String> {
    flags
        .iter()
        .map(|f| f.to_string())
        .chain(user_flags.iter().cloned())
        .chain(files.iter().map(|f| f.to_string_lossy().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Issue, Package};
    use crate::plugins::{PluginContext, ToolPlugin};
    use crate::resources::Resources;
    use crate::settings::Effective;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    struct EchoTool;

    impl ToolPlugin for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn file_types(&self) -> &'static [&'static str] {
            &["python_src"]
        }

        fn process_files(
            &self,
            _ctx: &PluginContext,
            _package: &Package,
            _level: &str,
            files: &[PathBuf],
            user_flags: &[String],
        ) -> Result<Vec<String>, ToolError> {
            Ok(vec![format!(
                "{}:1:{}\n",
                files[0].display(),
                user_flags.join(" ")
            )])
        }

        fn parse_output(
            &self,
            _ctx: &PluginContext,
            output: &[String],
            _package: &Package,
        ) -> Result<Vec<Issue>, ToolError> {
            Ok(output
                .iter()
                .flat_map(|o| o.lines())
                .filter_map(|l| {
                    let mut parts = l.splitn(3, ':');
                    let file = parts.next()?;
                    let line = parts.next()?.parse().ok()?;
                    Some(Issue::new(file, line, "echo", "E", 3, parts.next()?, None))
                })
                .collect())
        }
    }

    #[test]
    fn test_default_scan_without_files_is_clean() {
        let ctx = crate::plugins::testing::context();
        let pkg = Package::new("p", "/p");
        assert!(EchoTool.scan(&ctx, &pkg, "lvl").unwrap().is_empty());
    }

    #[test]
    fn test_default_scan_passes_flags_and_writes_log() {
        let out = tempdir().unwrap();
        let config = Config::from_yaml(
            "levels:\n  lvl:\n    tool:\n      echo:\n        flags: \"-x  'a b'\"\n",
        )
        .unwrap();
        let settings = Effective {
            output_directory: Some(out.path().to_path_buf()),
            ..Effective::default()
        };
        let ctx = PluginContext::new(settings, Arc::new(config), Arc::new(Resources::new(&[])));
        fs::create_dir_all(out.path().join("p-lvl")).unwrap();

        let mut pkg = Package::new("p", "/p");
        pkg.set_paths("python_src", vec![PathBuf::from("/p/a.py")]);
        let issues = EchoTool.scan(&ctx, &pkg, "lvl").unwrap();
        assert_eq!(issues, vec![Issue::new("/p/a.py", 1, "echo", "E", 3, "-x a b", None)]);
        let log = fs::read_to_string(out.path().join("p-lvl/echo.log")).unwrap();
        assert!(log.starts_with("/p/a.py:1:"));
    }

    #[test]
    fn test_command_args_order() {
        let args = command_args(&["-f", "json"], &["-x".into()], &[PathBuf::from("/a.sh")]);
        assert_eq!(args, vec!["-f", "json", "-x", "/a.sh"]);
    }

    #[test]
    fn test_missing_binary() {
        let err = run_tool("ghost", "lintherd-no-such-binary", &[], &[0]).unwrap_err();
        assert!(matches!(err, ToolError::MissingBinary { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let args = vec!["-c".to_string(), "echo found; exit 1".to_string()];
        let ok = run_tool("sh", "sh", &args, &[0, 1]).unwrap();
        assert_eq!(ok.code, 1);
        assert_eq!(ok.stdout.trim(), "found");
        let err = run_tool("sh", "sh", &args, &[0]).unwrap_err();
        assert!(matches!(err, ToolError::ExitCode { code: 1, .. }));
    }
}
