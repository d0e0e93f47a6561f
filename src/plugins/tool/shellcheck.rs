//! Shellcheck wrapper reading its JSON output.

use super::{command_args, run_tool};
use crate::error::ToolError;
use crate::models::package::SHELL_SRC;
use crate::models::{Issue, Package, UNKNOWN_LINE};
use crate::plugins::{PluginContext, ToolPlugin};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Finding {
    file: Option<String>,
    line: Option<i64>,
    level: Option<String>,
    code: Option<i64>,
    message: Option<String>,
}

fn severity(level: &str) -> i32 {
    match level {
        "style" | "info" => 1,
        "warning" => 3,
        "error" => 5,
        _ => 3,
    }
}

pub struct ShellcheckToolPlugin;

impl ToolPlugin for ShellcheckToolPlugin {
    fn name(&self) -> &'static str {
        "shellcheck"
    }

    fn file_types(&self) -> &'static [&'static str] {
        &[SHELL_SRC]
    }

    fn process_files(
        &self,
        ctx: &PluginContext,
        _package: &Package,
        _level: &str,
        files: &[PathBuf],
        user_flags: &[String],
    ) -> Result<Vec<String>, ToolError> {
        let args = command_args(&["-f", "json"], user_flags, files);
        // 1 means findings were reported.
        let out = run_tool(self.name(), ctx.settings.binary_for(self.name()), &args, &[0, 1])?;
        Ok(vec![out.stdout])
    }

    fn parse_output(
        &self,
        _ctx: &PluginContext,
        output: &[String],
        _package: &Package,
    ) -> Result<Vec<Issue>, ToolError> {
        let mut issues = Vec::new();
        for chunk in output.iter().filter(|o| !o.trim().is_empty()) {
            let findings: Vec<Finding> =
                serde_json::from_str(chunk).map_err(|e| ToolError::Output {
                    tool: self.name().to_string(),
                    message: e.to_string(),
                })?;
            for finding in findings {
                let (Some(file), Some(level), Some(code), Some(message)) = (
                    finding.file,
                    finding.level,
                    finding.code,
                    finding.message,
                ) else {
                    debug!("  Found invalid shellcheck output");
                    continue;
                };
                issues.push(Issue::new(
                    file,
                    finding.line.unwrap_or(UNKNOWN_LINE),
                    self.name(),
                    format!("SC{}", code),
                    severity(&level),
                    message,
                    None,
                ));
            }
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::context;

    #[test]
    fn test_parse_json_output() {
        let output = vec![r#"[
            {"file":"/src/a.sh","line":3,"endLine":3,"column":6,"endColumn":10,"level":"warning","code":2086,"message":"Double quote to prevent globbing and word splitting.","fix":null},
            {"file":"/src/a.sh","line":1,"level":"style","code":2148,"message":"Add a shebang."},
            {"file":"/src/a.sh","level":"error","code":1000,"message":"no line"},
            {"line":2,"level":"error","code":1000,"message":"no file"}
        ]"#
        .to_string()];
        let issues = ShellcheckToolPlugin
            .parse_output(&context(), &output, &Package::new("p", "/src"))
            .unwrap();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].issue_type, "SC2086");
        assert_eq!(issues[0].severity, 3);
        assert_eq!(issues[1].severity, 1);
        assert_eq!(issues[2].line_number, UNKNOWN_LINE);
        assert_eq!(issues[2].severity, 5);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let output = vec!["not json".to_string()];
        let err = ShellcheckToolPlugin
            .parse_output(&context(), &output, &Package::new("p", "/src"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Output { .. }));
    }
}
