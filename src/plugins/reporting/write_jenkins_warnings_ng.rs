//! Line-delimited JSON consumable by the Jenkins Warnings NG plugin.
//!
//! Written only when an output directory is configured.

use super::write_report;
use crate::error::ReportError;
use crate::models::{IssueMap, Package};
use crate::plugins::{PluginContext, ReportingPlugin};
use serde::Serialize;
use serde_json::Value as Json;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Record<'a> {
    category: &'a str,
    file_name: &'a str,
    line_start: i64,
    message: &'a str,
    severity: &'static str,
    #[serde(rename = "type")]
    kind: &'a str,
}

pub struct JenkinsWarningsNgReportingPlugin;

impl JenkinsWarningsNgReportingPlugin {
    /// One JSON object per issue and line, keys sorted.
    pub fn render(issues: &IssueMap) -> Result<String, ReportError> {
        let mut out = String::new();
        for issue in issues.values().flatten() {
            let record = Record {
                category: &issue.tool,
                file_name: &issue.filename,
                line_start: issue.line_number,
                message: &issue.message,
                severity: issue.tier().as_str(),
                kind: &issue.issue_type,
            };
            out.push_str(&serde_json::to_string(&record)?);
            out.push('\n');
        }
        Ok(out)
    }
}

impl ReportingPlugin for JenkinsWarningsNgReportingPlugin {
    fn name(&self) -> &'static str {
        "write_jenkins_warnings_ng"
    }

    fn report(
        &self,
        ctx: &PluginContext,
        package: &Package,
        issues: &IssueMap,
        level: &str,
    ) -> Result<Option<Json>, ReportError> {
        let Some(dir) = ctx.settings.package_output_dir(&package.name, level) else {
            return Ok(None);
        };
        let contents = Self::render(issues)?;
        write_report(&dir, package, level, ".jenkins-ng.json", &contents)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Issue;
    use crate::plugins::testing::context;

    #[test]
    fn test_render_sorted_keys_and_tiers() {
        let mut issues = IssueMap::new();
        issues.insert(
            "shellcheck".into(),
            vec![
                Issue::new("/a.sh", 3, "shellcheck", "SC2086", 3, "quote it", None),
                Issue::new("/a.sh", 1, "shellcheck", "SC2148", 0, "shebang", None),
            ],
        );
        let text = JenkinsWarningsNgReportingPlugin::render(&issues).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            r#"{"category":"shellcheck","fileName":"/a.sh","lineStart":3,"message":"quote it","severity":"HIGH","type":"SC2086"}"#
        );
        assert!(lines[1].contains(r#""severity":"LOW""#));
    }

    #[test]
    fn test_skipped_without_output_directory() {
        let pkg = Package::new("pkg", "/src/pkg");
        let result = JenkinsWarningsNgReportingPlugin
            .report(&context(), &pkg, &IssueMap::new(), "lint")
            .unwrap();
        assert!(result.is_none());
    }
}
