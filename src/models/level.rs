//! Level document schema.
//!
//! ```yaml
//! levels:
//!   strict:
//!     inherits_from: [base]
//!     discovery: {python: null}
//!     tool:
//!       pylint:
//!         flags: "--max-line-length=100"
//!     reporting: {print_to_console: null}
//! ```
//!
//! Plugin tables keep document order because enabled-plugin resolution is
//! order sensitive. A table may also be written as a plain list of names.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The three plugin categories a level configures.
pub enum PluginType {
    Discovery,
    Tool,
    Reporting,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginType::Discovery => "discovery",
            PluginType::Tool => "tool",
            PluginType::Reporting => "reporting",
        }
    }
}

impl fmt::Display for PluginType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// String-keyed table that remembers insertion order.
pub struct OrderedTable<T>(pub Vec<(String, T)>);

impl<T> Default for OrderedTable<T> {
    fn default() -> Self {
        OrderedTable(Vec::new())
    }
}

impl<T> OrderedTable<T> {
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, key: String, value: T) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OrderedTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for TableVisitor<T> {
            type Value = OrderedTable<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedTable::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = OrderedTable::default();
                while let Some((k, v)) = map.next_entry::<String, T>()? {
                    out.insert(k, v);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_any(TableVisitor(PhantomData))
    }
}

/// Per-plugin key/value settings, e.g. `flags`.
pub type PluginSettings = BTreeMap<String, Yaml>;

#[derive(Debug, Clone, Default, PartialEq)]
/// Enabled plugins of one category, in document order.
pub struct PluginTable(pub OrderedTable<Option<PluginSettings>>);

impl PluginTable {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys()
    }

    pub fn settings(&self, plugin: &str) -> Option<&PluginSettings> {
        self.0.get(plugin).and_then(|s| s.as_ref())
    }
}

impl<'de> Deserialize<'de> for PluginTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PluginTableVisitor;

        impl<'de> Visitor<'de> for PluginTableVisitor {
            type Value = PluginTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of plugin names or a list of plugin names")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(PluginTable::default())
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut table = OrderedTable::default();
                while let Some(name) = seq.next_element::<String>()? {
                    table.insert(name, None);
                }
                Ok(PluginTable(table))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut table = OrderedTable::default();
                while let Some((k, v)) = map.next_entry::<String, Option<PluginSettings>>()? {
                    table.insert(k, v);
                }
                Ok(PluginTable(table))
            }
        }

        deserializer.deserialize_any(PluginTableVisitor)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InheritsFrom {
    One(String),
    Many(Vec<String>),
}

fn inherits_from<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<InheritsFrom>::deserialize(deserializer)?;
    let parents = match raw {
        None => Vec::new(),
        Some(InheritsFrom::One(s)) => vec![s],
        Some(InheritsFrom::Many(v)) => v,
    };
    Ok(parents.into_iter().filter(|p| !p.trim().is_empty()).collect())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// One named level.
pub struct Level {
    #[serde(default)]
    pub discovery: Option<PluginTable>,
    #[serde(default)]
    pub tool: Option<PluginTable>,
    #[serde(default)]
    pub reporting: Option<PluginTable>,
    #[serde(default, deserialize_with = "inherits_from")]
    pub inherits_from: Vec<String>,
}

impl Level {
    pub fn plugins(&self, plugin_type: PluginType) -> Option<&PluginTable> {
        match plugin_type {
            PluginType::Discovery => self.discovery.as_ref(),
            PluginType::Tool => self.tool.as_ref(),
            PluginType::Reporting => self.reporting.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Top-level level document.
pub struct LevelDocument {
    #[serde(default)]
    pub levels: OrderedTable<Option<Level>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_tables_keep_document_order() {
        let doc: LevelDocument = serde_yaml::from_str(
            r#"
levels:
  base:
    tool:
      pylint:
      mypy:
        flags: "--strict"
      bandit: null
"#,
        )
        .unwrap();
        let base = doc.levels.get("base").unwrap().as_ref().unwrap();
        let names: Vec<_> = base.tool.as_ref().unwrap().names().collect();
        assert_eq!(names, vec!["pylint", "mypy", "bandit"]);
        let mypy = base.tool.as_ref().unwrap().settings("mypy").unwrap();
        assert_eq!(mypy.get("flags").and_then(|v| v.as_str()), Some("--strict"));
    }

    #[test]
    fn test_inherits_from_accepts_string_list_and_empty() {
        let doc: LevelDocument = serde_yaml::from_str(
            r#"
levels:
  a:
    inherits_from: base
  b:
    inherits_from: [base, extra]
  c:
    inherits_from: ""
  d:
"#,
        )
        .unwrap();
        let lvl = |n: &str| doc.levels.get(n).unwrap().clone().unwrap_or_default();
        assert_eq!(lvl("a").inherits_from, vec!["base"]);
        assert_eq!(lvl("b").inherits_from, vec!["base", "extra"]);
        assert!(lvl("c").inherits_from.is_empty());
        assert!(lvl("d").inherits_from.is_empty());
    }

    #[test]
    fn test_plugin_table_as_list() {
        let doc: LevelDocument =
            serde_yaml::from_str("levels:\n  l:\n    discovery: [python, shell]\n").unwrap();
        let l = doc.levels.get("l").unwrap().as_ref().unwrap();
        let names: Vec<_> = l.plugins(PluginType::Discovery).unwrap().names().collect();
        assert_eq!(names, vec!["python", "shell"]);
    }
}
