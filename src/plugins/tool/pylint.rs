//! Pylint wrapper. Output is forced into a fixed one-line-per-message
//! template so it can be parsed without pylint's own report sections.

use super::{command_args, run_tool};
use crate::error::ToolError;
use crate::models::package::PYTHON_SRC;
use crate::models::{Issue, Package};
use crate::plugins::{PluginContext, ToolPlugin};
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

const MSG_TEMPLATE: &str = "--msg-template={abspath}:{line}: [{msg_id}({symbol}), {obj}] {msg}";
/// Exit code for a usage error; every other code encodes findings.
const USAGE_ERROR: i32 = 32;

fn line_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+):(\d+):\s\[(.+?)\]\s(.+)$").ok()).as_ref()
}

pub struct PylintToolPlugin;

impl ToolPlugin for PylintToolPlugin {
    fn name(&self) -> &'static str {
        "pylint"
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
        let mut flags = vec![MSG_TEMPLATE.to_string(), "--reports=no".to_string()];
        flags.extend(user_flags.iter().cloned());
        if let Some(procs) = ctx.settings.max_procs {
            flags.push(format!("-j{}", procs));
        }
        let args = command_args(&[], &flags, files);
        let ok_codes: Vec<i32> = (0..=255).filter(|c| *c != USAGE_ERROR).collect();
        let out = run_tool(self.name(), ctx.settings.binary_for(self.name()), &args, &ok_codes)?;
        Ok(vec![out.combined()])
    }

    fn parse_output(
        &self,
        ctx: &PluginContext,
        output: &[String],
        _package: &Package,
    ) -> Result<Vec<Issue>, ToolError> {
        let mapping = self.load_mapping(ctx);
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
            let (issue_type, message) = match caps[3].split_once(',') {
                Some((kind, obj)) if !obj.trim().is_empty() => {
                    (kind.to_string(), format!("{}: {}", obj.trim(), &caps[4]))
                }
                Some((kind, _)) => (kind.to_string(), caps[4].to_string()),
                None => (caps[3].to_string(), caps[4].to_string()),
            };
            let msg_id = issue_type.split('(').next().unwrap_or_default();
            let cert_reference = mapping.get(msg_id).cloned();
            issues.push(Issue::new(
                &caps[1],
                line_number,
                self.name(),
                issue_type,
                5,
                message,
                cert_reference,
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
        let output = vec![
            "************* Module a\n\
             /src/a.py:1: [C0114(missing-module-docstring), ] Missing module docstring\n\
             /src/a.py:7: [W0612(unused-variable), main] Unused variable 'x'\n\
             garbage line\n"
                .to_string(),
        ];
        let issues = PylintToolPlugin
            .parse_output(&context(), &output, &Package::new("p", "/src"))
            .unwrap();
        assert_eq!(
            issues,
            vec![
                Issue::new(
                    "/src/a.py",
                    1,
                    "pylint",
                    "C0114(missing-module-docstring)",
                    5,
                    "Missing module docstring",
                    None
                ),
                Issue::new(
                    "/src/a.py",
                    7,
                    "pylint",
                    "W0612(unused-variable)",
                    5,
                    "main: Unused variable 'x'",
                    None
                ),
            ]
        );
    }
}
