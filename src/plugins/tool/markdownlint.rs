//! Markdownlint wrapper.

use super::{command_args, run_tool};
use crate::error::ToolError;
use crate::models::package::MARKDOWN_SRC;
use crate::models::{Issue, Package};
use crate::plugins::{PluginContext, ToolPlugin};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::warn;

const DEFAULT_CONFIG: &str = ".markdownlintrc";
/// Node prints these when a module is missing; the exit code matches the
/// "issues found" code, so the text is the only signal.
const NODE_FAILURES: &[&str] = &["Error: Cannot find module", "Require stack:"];

fn line_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+?):(\d+)(?::\d+)?\s(\S+)\s(.+)$").ok()).as_ref()
}

pub struct MarkdownlintToolPlugin;

impl ToolPlugin for MarkdownlintToolPlugin {
    fn name(&self) -> &'static str {
        "markdownlint"
    }

    fn file_types(&self) -> &'static [&'static str] {
        &[MARKDOWN_SRC]
    }

    fn process_files(
        &self,
        ctx: &PluginContext,
        _package: &Package,
        level: &str,
        files: &[PathBuf],
        user_flags: &[String],
    ) -> Result<Vec<String>, ToolError> {
        let config_name = ctx
            .config
            .get_tool_config(self.name(), level, "config", Some(DEFAULT_CONFIG))?
            .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
        let mut flags = Vec::new();
        if let Some(config) = ctx.resources.get_file(&config_name) {
            flags.push("-c".to_string());
            flags.push(config.to_string_lossy().to_string());
        }
        flags.extend(user_flags.iter().cloned());
        let args = command_args(&[], &flags, files);
        let out = run_tool(self.name(), ctx.settings.binary_for(self.name()), &args, &[0, 1])?;
        let text = out.combined();
        if NODE_FAILURES.iter().any(|f| text.contains(f)) {
            warn!("{} exception: {}", self.name(), text);
            return Err(ToolError::ExitCode {
                tool: self.name().to_string(),
                code: out.code,
            });
        }
        Ok(vec![text])
    }

    fn parse_output(
        &self,
        _ctx: &PluginContext,
        output: &[String],
        _package: &Package,
    ) -> Result<Vec<Issue>, ToolError> {
        let Some(re) = line_re() else {
            return Err(ToolError::Output {
                tool: self.name().to_string(),
                message: "invalid line pattern".to_string(),
            });
        };
        let mut issues = Vec::new();
        for line in output.iter().flat_map(|o| o.lines()) {
            let Some(caps) = re.captures(line) else {
                continue;
            };
            let Ok(line_number) = caps[2].parse::<i64>() else {
                continue;
            };
            issues.push(Issue::new(
                &caps[1],
                line_number,
                self.name(),
                &caps[3],
                3,
                &caps[4],
                None,
            ));
        }
        Ok(issues)
    }
}
