//! Shared data models: the normalized issue record, packages, and the serde
//! schemas of the level/profile/exceptions documents.

pub mod exception;
pub mod level;
pub mod package;
pub mod profile;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use package::{Discovered, Package, PackageFile};

/// Line number used by tools that cannot attribute an issue to a line.
pub const UNKNOWN_LINE: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// A single finding normalized from one tool's output.
///
/// Equality covers all seven fields; exception filtering removes issues by
/// value, so two identical findings are indistinguishable.
pub struct Issue {
    pub filename: String,
    pub line_number: i64,
    pub tool: String,
    pub issue_type: String,
    pub severity: i32,
    pub message: String,
    pub cert_reference: Option<String>,
}

impl Issue {
    pub fn new(
        filename: impl Into<String>,
        line_number: i64,
        tool: impl Into<String>,
        issue_type: impl Into<String>,
        severity: i32,
        message: impl Into<String>,
        cert_reference: Option<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            line_number,
            tool: tool.into(),
            issue_type: issue_type.into(),
            severity,
            message: message.into(),
            cert_reference,
        }
    }

    /// Reporting tier for this issue's severity.
    pub fn tier(&self) -> SeverityTier {
        SeverityTier::from_severity(self.severity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Buckets used by reporters: `<=0` low, `>0` normal, `>2` high, `>4` error.
pub enum SeverityTier {
    Low,
    Normal,
    High,
    Error,
}

impl SeverityTier {
    pub fn from_severity(severity: i32) -> Self {
        if severity > 4 {
            SeverityTier::Error
        } else if severity > 2 {
            SeverityTier::High
        } else if severity > 0 {
            SeverityTier::Normal
        } else {
            SeverityTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityTier::Low => "LOW",
            SeverityTier::Normal => "NORMAL",
            SeverityTier::High => "HIGH",
            SeverityTier::Error => "ERROR",
        }
    }
}

/// Issues keyed by the name of the tool that produced them.
///
/// A tool that failed is absent from the map; a tool that ran cleanly maps
/// to an empty list.
pub type IssueMap = BTreeMap<String, Vec<Issue>>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Aggregated counts used by printers and the exit code.
pub struct Summary {
    pub tools: usize,
    pub issues: usize,
    pub low: usize,
    pub normal: usize,
    pub high: usize,
    pub errors: usize,
}

impl Summary {
    pub fn from_issues(issues: &IssueMap) -> Self {
        let mut summary = Summary {
            tools: issues.len(),
            ..Summary::default()
        };
        for issue in issues.values().flatten() {
            summary.issues += 1;
            match issue.tier() {
                SeverityTier::Low => summary.low += 1,
                SeverityTier::Normal => summary.normal += 1,
                SeverityTier::High => summary.high += 1,
                SeverityTier::Error => summary.errors += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: i32) -> Issue {
        Issue::new("/tmp/a.py", 3, "pylint", "C0301", severity, "Line too long", None)
    }

    #[test]
    fn test_issue_equality_covers_all_fields() {
        let a = issue(5);
        let mut b = issue(5);
        assert_eq!(a, b);
        b.cert_reference = Some("MSC00-C".into());
        assert_ne!(a, b);
    }

    #[test]
    fn test_severity_tiers() {
        assert_eq!(SeverityTier::from_severity(-1), SeverityTier::Low);
        assert_eq!(SeverityTier::from_severity(0), SeverityTier::Low);
        assert_eq!(SeverityTier::from_severity(1), SeverityTier::Normal);
        assert_eq!(SeverityTier::from_severity(3), SeverityTier::High);
        assert_eq!(SeverityTier::from_severity(5), SeverityTier::Error);
    }

    #[test]
    fn test_summary_counts_per_tier() {
        let mut issues = IssueMap::new();
        issues.insert("pylint".into(), vec![issue(5), issue(1)]);
        issues.insert("mypy".into(), vec![]);
        let summary = Summary::from_issues(&issues);
        assert_eq!(summary.tools, 2);
        assert_eq!(summary.issues, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.normal, 1);
    }
}
