//! Exceptions document schema.
//!
//! ```yaml
//! ignore_packages: [vendored_pkg]
//! global:
//!   exceptions:
//!     file:
//!       - tools: all
//!         globs: ["*/build/*", "third_party/*"]
//!     message_regex:
//!       - tools: [pylint]
//!         regex: "Line too long"
//!         globs: ["*/legacy/*"]
//! packages:
//!   my_pkg:
//!     exceptions:
//!       file:
//!         - tools: [shellcheck]
//!           globs: ["scripts/*"]
//! ```
//!
//! Every nested section is optional. The raw document is resolved once into
//! the flat [`RuleSet`] form so filtering never re-checks for missing keys.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which tools a rule applies to.
pub enum ToolScope {
    All,
    Only(Vec<String>),
}

impl ToolScope {
    pub fn is_all(&self) -> bool {
        matches!(self, ToolScope::All)
    }

    pub fn applies_to(&self, tool: &str) -> bool {
        match self {
            ToolScope::All => true,
            ToolScope::Only(tools) => tools.iter().any(|t| t == tool),
        }
    }
}

impl<'de> Deserialize<'de> for ToolScope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) if s == "all" => ToolScope::All,
            Raw::One(s) => ToolScope::Only(vec![s]),
            Raw::Many(v) => ToolScope::Only(v),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Drop issues (or discovered files) whose path matches any glob.
pub struct FileRule {
    pub tools: ToolScope,
    #[serde(default)]
    pub globs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Drop issues whose message starts with a match of `regex`, optionally
/// restricted to filenames matching `globs`.
pub struct RegexRule {
    pub tools: ToolScope,
    pub regex: String,
    #[serde(default)]
    pub globs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Exception rules applicable to one package.
pub struct RuleSet {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file: Vec<FileRule>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message_regex: Vec<RegexRule>,
}

impl RuleSet {
    pub fn extend(&mut self, other: &RuleSet) {
        self.file.extend(other.file.iter().cloned());
        self.message_regex.extend(other.message_regex.iter().cloned());
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExceptionsSection {
    #[serde(default)]
    pub exceptions: Option<RuleSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExceptionsDocument {
    #[serde(default)]
    pub ignore_packages: Option<Vec<String>>,
    #[serde(default)]
    pub global: Option<ExceptionsSection>,
    #[serde(default)]
    pub packages: Option<BTreeMap<String, Option<ExceptionsSection>>>,
}
