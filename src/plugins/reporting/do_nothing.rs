//! Reporting plugin that emits nothing; useful when only the exit status
//! matters.

use crate::error::ReportError;
use crate::models::{IssueMap, Package};
use crate::plugins::{PluginContext, ReportingPlugin};
use serde_json::Value as Json;

pub struct DoNothingReportingPlugin;

impl ReportingPlugin for DoNothingReportingPlugin {
    fn name(&self) -> &'static str {
        "do_nothing"
    }

    fn report(
        &self,
        _ctx: &PluginContext,
        _package: &Package,
        _issues: &IssueMap,
        _level: &str,
    ) -> Result<Option<Json>, ReportError> {
        Ok(None)
    }
}
