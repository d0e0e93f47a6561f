//! Exception filtering engine.
//!
//! Exceptions suppress known or ignorable issues. Three mechanisms apply, in
//! order, after all tools have run:
//! - file rules: drop issues whose file matches a glob (absolute filename or
//!   path relative to the package root);
//! - message regex rules: drop issues whose message starts with a match,
//!   optionally only for files matching the rule's globs;
//! - inline `NOLINT` markers on the reported source line.
//!
//! File rules scoped to `all` tools are also applied to freshly discovered
//! file lists, so tools are never run on files that would be ignored anyway.
//!
//! File and NOLINT filtering need absolute issue filenames. Issues with
//! relative filenames are kept, with one warning per tool per pass.

use crate::error::ExceptionsError;
use crate::models::exception::{ExceptionsDocument, FileRule, RegexRule, RuleSet};
use crate::models::{Issue, IssueMap, Package};
use regex::Regex;
use serde_yaml::Value as Yaml;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Legacy CI checkout prefix stripped before matching `*/build/*`, so that
/// rule does not match every file of a checkout living under `.../build/`.
const CI_BUILD_PREFIX: &str = "/home/travis/build/";
const CI_BUILD_GLOB: &str = "*/build/*";

const NOLINT: &str = "NOLINT";

#[derive(Debug, Clone, Default)]
pub struct Exceptions {
    ignore_packages: Vec<String>,
    global: RuleSet,
    packages: BTreeMap<String, RuleSet>,
}

#[derive(Debug, Default)]
/// State shared by the stages of one filtering pass.
pub struct FilterPass {
    warned: BTreeSet<String>,
    lines: HashMap<String, Option<Vec<String>>>,
}

impl FilterPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tools that emitted relative filenames during this pass.
    pub fn warned_tools(&self) -> &BTreeSet<String> {
        &self.warned
    }

    fn warn_relative(&mut self, tool: &str) {
        if self.warned.insert(tool.to_string()) {
            warn!(
                "File exceptions not available for {} tool plugin due to lack of absolute paths for issues.",
                tool
            );
        }
    }

    fn source_line(&mut self, filename: &str, line_number: i64) -> Option<&str> {
        let index = usize::try_from(line_number.checked_sub(1)?).ok()?;
        let lines = self
            .lines
            .entry(filename.to_string())
            .or_insert_with(|| match fs::read(filename) {
                Ok(bytes) => Some(split_lines(&String::from_utf8_lossy(&bytes))),
                Err(e) => {
                    debug!("unable to read {} for NOLINT check: {}", filename, e);
                    None
                }
            });
        lines.as_ref()?.get(index).map(String::as_str)
    }
}

impl Exceptions {
    /// Load an exceptions document. Missing, empty, or malformed files are
    /// errors.
    pub fn new(path: &Path) -> Result<Self, ExceptionsError> {
        let text = fs::read_to_string(path).map_err(|source| ExceptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ExceptionsError> {
        Self::parse(text, Path::new("<memory>"))
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ExceptionsError> {
        let yaml_err = |source| ExceptionsError::Yaml {
            path: path.to_path_buf(),
            source,
        };
        let value: Yaml = serde_yaml::from_str(text).map_err(yaml_err)?;
        if value.is_null() {
            return Err(ExceptionsError::Empty(path.to_path_buf()));
        }
        let doc: ExceptionsDocument = serde_yaml::from_value(value).map_err(yaml_err)?;
        Ok(Self::from_document(doc))
    }

    fn from_document(doc: ExceptionsDocument) -> Self {
        let global = doc.global.and_then(|g| g.exceptions).unwrap_or_default();
        let packages = doc
            .packages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(name, section)| Some((name, section?.exceptions?)))
            .collect();
        Self {
            ignore_packages: doc.ignore_packages.unwrap_or_default(),
            global,
            packages,
        }
    }

    /// Packages to skip entirely.
    pub fn get_ignore_packages(&self) -> &[String] {
        &self.ignore_packages
    }

    pub fn is_ignored(&self, package: &Package) -> bool {
        self.ignore_packages.iter().any(|p| *p == package.name)
    }

    /// Global rules followed by the package's own rules.
    pub fn get_exceptions(&self, package: &Package) -> RuleSet {
        let mut rules = self.global.clone();
        if let Some(own) = self.packages.get(&package.name) {
            rules.extend(own);
        }
        rules
    }

    /// Drop discovered files matched by a file rule scoped to all tools.
    ///
    /// Order of the remaining files is preserved.
    pub fn filter_file_exceptions_early<P: AsRef<Path>>(
        &self,
        package: &Package,
        files: Vec<P>,
    ) -> Vec<P> {
        let rules = self.get_exceptions(package);
        let globs: Vec<Vec<FilePattern>> = rules
            .file
            .iter()
            .filter(|r| r.tools.is_all())
            .map(|r| compile_globs(&r.globs))
            .collect();
        if globs.is_empty() {
            return files;
        }
        files
            .into_iter()
            .filter(|f| {
                let name = f.as_ref().to_string_lossy();
                !globs
                    .iter()
                    .any(|rule| rule.iter().any(|p| p.matches(legacy_candidate(p, &name))))
            })
            .collect()
    }

    /// Drop issues whose file matches a file rule scoped to their tool.
    pub fn filter_file_exceptions(
        &self,
        package: &Package,
        rules: &[FileRule],
        issues: IssueMap,
    ) -> IssueMap {
        self.filter_file_exceptions_in(package, rules, issues, &mut FilterPass::new())
    }

    fn filter_file_exceptions_in(
        &self,
        package: &Package,
        rules: &[FileRule],
        mut issues: IssueMap,
        pass: &mut FilterPass,
    ) -> IssueMap {
        let compiled: Vec<(&FileRule, Vec<FilePattern>)> =
            rules.iter().map(|r| (r, compile_globs(&r.globs))).collect();
        for (tool, tool_issues) in issues.iter_mut() {
            let scoped: Vec<&Vec<FilePattern>> = compiled
                .iter()
                .filter(|(r, _)| r.tools.applies_to(tool))
                .map(|(_, g)| g)
                .collect();
            let mut to_remove: HashSet<Issue> = HashSet::new();
            for issue in tool_issues.iter() {
                if !Path::new(&issue.filename).is_absolute() {
                    pass.warn_relative(tool);
                    continue;
                }
                if scoped.is_empty() {
                    continue;
                }
                let rel_path = pathdiff::diff_paths(&issue.filename, &package.path)
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| issue.filename.clone());
                let hit = scoped.iter().any(|globs| {
                    globs.iter().any(|p| {
                        p.matches(legacy_candidate(p, &issue.filename)) || p.matches(&rel_path)
                    })
                });
                if hit {
                    to_remove.insert(issue.clone());
                }
            }
            remove_all(tool_issues, &to_remove);
        }
        issues
    }

    /// Drop issues whose message starts with a match of a regex rule.
    ///
    /// Rules with invalid patterns are logged and skipped.
    pub fn filter_regex_exceptions(rules: &[RegexRule], mut issues: IssueMap) -> IssueMap {
        for rule in rules {
            let compiled = match Regex::new(&format!("^(?:{})", rule.regex)) {
                Ok(re) => re,
                Err(e) => {
                    warn!("Invalid regular expression in exception: {}: {}", rule.regex, e);
                    continue;
                }
            };
            let globs = rule.globs.as_deref().map(compile_globs);
            for (tool, tool_issues) in issues.iter_mut() {
                if !rule.tools.applies_to(tool) {
                    continue;
                }
                let to_remove: HashSet<Issue> = tool_issues
                    .iter()
                    .filter(|issue| match &globs {
                        Some(globs) => globs.iter().any(|p| p.matches(&issue.filename)),
                        None => true,
                    })
                    .filter(|issue| compiled.is_match(&issue.message))
                    .cloned()
                    .collect();
                remove_all(tool_issues, &to_remove);
            }
        }
        issues
    }

    /// Drop issues reported on a source line carrying a `NOLINT` marker.
    pub fn filter_nolint(&self, issues: IssueMap) -> IssueMap {
        self.filter_nolint_in(issues, &mut FilterPass::new())
    }

    fn filter_nolint_in(&self, mut issues: IssueMap, pass: &mut FilterPass) -> IssueMap {
        for (tool, tool_issues) in issues.iter_mut() {
            let mut to_remove: HashSet<Issue> = HashSet::new();
            for issue in tool_issues.iter() {
                if !Path::new(&issue.filename).is_absolute() {
                    pass.warn_relative(tool);
                    continue;
                }
                if let Some(line) = pass.source_line(&issue.filename, issue.line_number) {
                    if line.contains(NOLINT) {
                        to_remove.insert(issue.clone());
                    }
                }
            }
            remove_all(tool_issues, &to_remove);
        }
        issues
    }

    /// Apply file, regex, and NOLINT filtering for `package`.
    pub fn filter_issues(&self, package: &Package, issues: IssueMap) -> IssueMap {
        let mut pass = FilterPass::new();
        self.filter_issues_in(package, issues, &mut pass)
    }

    /// Like [`Exceptions::filter_issues`], recording pass state in `pass`.
    pub fn filter_issues_in(
        &self,
        package: &Package,
        mut issues: IssueMap,
        pass: &mut FilterPass,
    ) -> IssueMap {
        let rules = self.get_exceptions(package);
        if !rules.file.is_empty() {
            issues = self.filter_file_exceptions_in(package, &rules.file, issues, pass);
        }
        if !rules.message_regex.is_empty() {
            issues = Self::filter_regex_exceptions(&rules.message_regex, issues);
        }
        self.filter_nolint_in(issues, pass)
    }
}

/// Shell-style pattern with `fnmatch` semantics: `*` and `?` also match
/// `/`, `[!...]` negates a set and an unclosed `[` is literal.
#[derive(Debug, Clone)]
struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    fn new(glob: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: glob.to_string(),
            regex: Regex::new(&translate_glob(glob))?,
        })
    }

    fn as_str(&self) -> &str {
        &self.source
    }

    fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Regex source equivalent to `glob`, anchored at both ends.
fn translate_glob(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from(r"(?s)\A");
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if chars.get(j) == Some(&'!') {
                    j += 1;
                }
                if chars.get(j) == Some(&']') {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                    continue;
                }
                let mut body = &chars[i..j];
                i = j + 1;
                out.push('[');
                if body.first() == Some(&'!') {
                    out.push('^');
                    body = &body[1..];
                }
                for ch in body {
                    if *ch == '-' {
                        out.push('-');
                    } else {
                        out.push_str(&regex::escape(&ch.to_string()));
                    }
                }
                out.push(']');
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push_str(r"\z");
    out
}

fn compile_globs(globs: &[String]) -> Vec<FilePattern> {
    globs
        .iter()
        .filter_map(|g| match FilePattern::new(g) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("Invalid glob in exception: {}: {}", g, e);
                None
            }
        })
        .collect()
}

fn legacy_candidate<'a>(pattern: &FilePattern, filename: &'a str) -> &'a str {
    if pattern.as_str() == CI_BUILD_GLOB {
        filename.strip_prefix(CI_BUILD_PREFIX).unwrap_or(filename)
    } else {
        filename
    }
}

/// Lines of `text`, split on `\r\n`, `\n` or a lone `\r`.
fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(['\n', '\r']) {
            Some(at) => {
                lines.push(rest[..at].to_string());
                let skip = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[at + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

fn remove_all(issues: &mut Vec<Issue>, to_remove: &HashSet<Issue>) {
    if !to_remove.is_empty() {
        issues.retain(|i| !to_remove.contains(i));
    }
}
