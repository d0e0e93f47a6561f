//! Mypy wrapper.

use super::{command_args, run_tool};
use crate::error::ToolError;
use crate::models::package::PYTHON_SRC;
use crate::models::{Issue, Package};
use crate::plugins::{PluginContext, ToolPlugin};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const FLAGS: &[&str] = &[
    "--show-absolute-path",
    "--show-error-codes",
    "--no-error-summary",
];

fn line_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.+?):(\d+):(?:\d+:)?\s(error|warning|note):\s(.+?)(?:\s+\[([\w-]+)\])?$").ok()
    })
    .as_ref()
}

pub struct MypyToolPlugin;

impl ToolPlugin for MypyToolPlugin {
    fn name(&self) -> &'static str {
        "mypy"
    }

    fn file_types(&self) -> &'static [&'static str] {
        &[PYTHON_SRC]
    }

    fn process_files(
        &self,
        ctx: &PluginContext,
        _package: &Package,
        _level: &str,
        files: &[PathBuf],
        user_flags: &[String],
    ) -> Result<Vec<String>, ToolError> {
        let args = command_args(FLAGS, user_flags, files);
        // 1 means type errors were found.
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
            if !Path::new(&caps[1]).is_absolute() {
                continue;
            }
            let severity = match &caps[3] {
                "error" => 5,
                "warning" => 3,
                _ => continue,
            };
            let Ok(line_number) = caps[2].parse::<i64>() else {
                continue;
            };
            let issue_type = caps.get(5).map(|m| m.as_str()).unwrap_or(&caps[3]);
            issues.push(Issue::new(
                &caps[1],
                line_number,
                self.name(),
                issue_type,
                severity,
                &caps[4],
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
            "/src/a.py:3: error: Incompatible types in assignment [assignment]\n",
            "/src/a.py:3: note: See https://example.invalid for details\n",
            "a.py:9: error: relative paths are skipped [misc]\n",
            "/src/b.py:12:5: error: Name \"x\" is not defined  [name-defined]\n",
        )
        .to_string()];
        let issues = MypyToolPlugin
            .parse_output(&context(), &output, &Package::new("p", "/src"))
            .unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_type, "assignment");
        assert_eq!(issues[0].message, "Incompatible types in assignment");
        assert_eq!(issues[0].severity, 5);
        assert_eq!(issues[1].line_number, 12);
        assert_eq!(issues[1].issue_type, "name-defined");
        assert_eq!(issues[1].message, "Name \"x\" is not defined");
    }
}
