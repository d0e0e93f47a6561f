//! Profile document schema: which level each package is scanned at.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileDocument {
    pub default: String,
    #[serde(default)]
    pub packages: Option<BTreeMap<String, String>>,
}
