//! Human-readable console report.
//!
//! Prints each tool's unique issues followed by a total. Severity tiers are
//! colored unless `NO_COLOR` is set. The returned summary carries the
//! per-tier counts.

use super::unique_issues;
use crate::error::ReportError;
use crate::models::{Issue, IssueMap, Package, SeverityTier, Summary};
use crate::plugins::{PluginContext, ReportingPlugin};
use crate::utils::use_colors;
use owo_colors::OwoColorize;
use serde_json::Value as Json;

pub struct PrintToConsoleReportingPlugin;

impl PrintToConsoleReportingPlugin {
    /// Report lines, colored when `color` is set.
    pub fn render(issues: &IssueMap, color: bool) -> Vec<String> {
        let mut lines = Vec::new();
        let mut total = 0;
        for (tool, tool_issues) in issues {
            let unique = unique_issues(tool_issues);
            let header = format!("Tool {}: {} unique issues", tool, unique.len());
            lines.push(if color {
                header.bold().to_string()
            } else {
                header
            });
            for issue in &unique {
                lines.push(format!("  {}", issue_line(issue, color)));
            }
            total += unique.len();
        }
        let footer = format!("{} total unique issues", total);
        lines.push(if color {
            footer.bold().to_string()
        } else {
            footer
        });
        lines
    }
}

fn issue_line(issue: &Issue, color: bool) -> String {
    let reference = issue
        .cert_reference
        .as_ref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    let severity = format!("[{}]", issue.severity);
    let severity = if color {
        match issue.tier() {
            SeverityTier::Error => severity.red().bold().to_string(),
            SeverityTier::High => severity.yellow().bold().to_string(),
            SeverityTier::Normal => severity.blue().to_string(),
            SeverityTier::Low => severity.bright_black().to_string(),
        }
    } else {
        severity
    };
    let location = format!("{}:{}", issue.filename, issue.line_number);
    let location = if color {
        location.bold().to_string()
    } else {
        location
    };
    format!(
        "{}: {}:{}: {}{} {}",
        location, issue.tool, issue.issue_type, issue.message, reference, severity
    )
}

impl ReportingPlugin for PrintToConsoleReportingPlugin {
    fn name(&self) -> &'static str {
        "print_to_console"
    }

    fn report(
        &self,
        _ctx: &PluginContext,
        _package: &Package,
        issues: &IssueMap,
        _level: &str,
    ) -> Result<Option<Json>, ReportError> {
        for line in Self::render(issues, use_colors()) {
            println!("{}", line);
        }
        Ok(Some(serde_json::to_value(Summary::from_issues(issues))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::context;

    #[test]
    fn test_render_plain() {
        let dup = Issue::new("/a.py", 4, "pylint", "W0611", 5, "unused import", None);
        let mut issues = IssueMap::new();
        issues.insert("mypy".into(), vec![]);
        issues.insert(
            "pylint".into(),
            vec![
                dup.clone(),
                dup,
                Issue::new("/b.py", 1, "pylint", "C0114", 1, "docstring", Some("DCL00".into())),
            ],
        );
        let lines = PrintToConsoleReportingPlugin::render(&issues, false);
        assert_eq!(
            lines,
            vec![
                "Tool mypy: 0 unique issues",
                "Tool pylint: 2 unique issues",
                "  /a.py:4: pylint:W0611: unused import [5]",
                "  /b.py:1: pylint:C0114: docstring (DCL00) [1]",
                "2 total unique issues",
            ]
        );
    }

    #[test]
    fn test_report_returns_summary() {
        let mut issues = IssueMap::new();
        issues.insert(
            "pylint".into(),
            vec![Issue::new("/a.py", 4, "pylint", "W0611", 5, "unused import", None)],
        );
        let summary = PrintToConsoleReportingPlugin
            .report(&context(), &Package::new("p", "/p"), &issues, "lint")
            .unwrap()
            .unwrap();
        assert_eq!(summary["errors"], 1);
        assert_eq!(summary["tools"], 1);
    }
}
