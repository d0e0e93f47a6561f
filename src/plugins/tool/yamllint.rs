//! Yamllint wrapper using its `parsable` output format.

use super::{command_args, run_tool};
use crate::error::ToolError;
use crate::models::package::YAML_SRC;
use crate::models::{Issue, Package};
use crate::plugins::{PluginContext, ToolPlugin};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

fn line_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+):(\d+):(\d+):\s\[(.+?)\]\s(.+)\s\((.+)\)$").ok())
        .as_ref()
}

pub struct YamllintToolPlugin;

impl ToolPlugin for YamllintToolPlugin {
    fn name(&self) -> &'static str {
        "yamllint"
    }

    fn file_types(&self) -> &'static [&'static str] {
        &[YAML_SRC]
    }

    fn process_files(
        &self,
        ctx: &PluginContext,
        _package: &Package,
        _level: &str,
        files: &[PathBuf],
        user_flags: &[String],
    ) -> Result<Vec<String>, ToolError> {
        let args = command_args(&["-f", "parsable"], user_flags, files);
        let out = run_tool(self.name(), ctx.settings.binary_for(self.name()), &args, &[0, 1])?;
        Ok(vec![out.combined()])
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
            let severity = if &caps[4] == "error" { 5 } else { 3 };
            issues.push(Issue::new(
                &caps[1],
                line_number,
                self.name(),
                &caps[6],
                severity,
                &caps[5],
                None,
            ));
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::context;

    #[test]
    fn test_parse_output() {
        let output = vec![concat!(
            "/src/a.yaml:1:1: [warning] missing document start \"---\" (document-start)\n",
            "/src/a.yaml:4:81: [error] line too long (92 > 80 characters) (line-length)\n",
        )
        .to_string()];
        let issues = YamllintToolPlugin
            .parse_output(&context(), &output, &Package::new("p", "/src"))
            .unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_type, "document-start");
        assert_eq!(issues[0].severity, 3);
        assert_eq!(issues[1].severity, 5);
        assert_eq!(issues[1].message, "line too long (92 > 80 characters)");
    }
}
