//! JSON report of every issue, written to a file and/or printed.
//!
//! Switches (reporting config of the level):
//! - `files`: write `<package>-<level>.lintherd.json` into the package
//!   output directory (or the current directory).
//! - `terminal`: print the document on stdout.

use super::{report_dir, write_report};
use crate::config::Config;
use crate::error::ReportError;
use crate::models::{IssueMap, Package};
use crate::plugins::{PluginContext, ReportingPlugin};
use serde_json::{json, Value as Json};

pub struct JsonReportingPlugin;

impl JsonReportingPlugin {
    /// The report document; key order is stable.
    pub fn document(issues: &IssueMap) -> Json {
        let all: Vec<Json> = issues
            .values()
            .flatten()
            .map(|issue| {
                json!({
                    "fileName": issue.filename,
                    "lineNumber": issue.line_number,
                    "tool": issue.tool,
                    "type": issue.issue_type,
                    "severity": issue.severity,
                    "message": issue.message,
                    "certReference": issue.cert_reference.clone().unwrap_or_default(),
                })
            })
            .collect();
        json!({ "issues": all })
    }
}

impl ReportingPlugin for JsonReportingPlugin {
    fn name(&self) -> &'static str {
        "json"
    }

    fn report(
        &self,
        ctx: &PluginContext,
        package: &Package,
        issues: &IssueMap,
        level: &str,
    ) -> Result<Option<Json>, ReportError> {
        let files = ctx.config.get_reporting_config(self.name(), level, "files", None)?;
        let terminal = ctx.config.get_reporting_config(self.name(), level, "terminal", None)?;
        let line = serde_json::to_string(&Self::document(issues))?;
        if Config::str_to_bool(files.as_deref()) {
            write_report(&report_dir(ctx, package, level), package, level, ".lintherd.json", &line)?;
        }
        if Config::str_to_bool(terminal.as_deref()) {
            println!("{}", line);
        }
        Ok(None)
    }
}
