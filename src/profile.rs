//! Maps packages to the level they are scanned at.

use crate::error::ProfileError;
use crate::models::profile::ProfileDocument;
use crate::models::Package;
use serde_yaml::Value as Yaml;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Profile {
    doc: ProfileDocument,
}

impl Profile {
    /// Load a profile; the file must exist, parse, and carry a `default` key.
    pub fn new(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ProfileError> {
        Self::parse(text, Path::new("<memory>"))
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ProfileError> {
        let yaml_err = |source| ProfileError::Yaml {
            path: path.to_path_buf(),
            source,
        };
        let value: Yaml = serde_yaml::from_str(text).map_err(yaml_err)?;
        if value.is_null() {
            return Err(ProfileError::Empty(path.to_path_buf()));
        }
        if value.get("default").is_none() {
            return Err(ProfileError::MissingDefault(path.to_path_buf()));
        }
        let doc = serde_yaml::from_value(value).map_err(yaml_err)?;
        Ok(Self { doc })
    }

    pub fn default_level(&self) -> &str {
        &self.doc.default
    }

    /// Level for `package`: its explicit entry, else the profile default.
    pub fn get_package_level(&self, package: &Package) -> &str {
        self.doc
            .packages
            .as_ref()
            .and_then(|p| p.get(&package.name))
            .map(String::as_str)
            .unwrap_or(&self.doc.default)
    }
}
