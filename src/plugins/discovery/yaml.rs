//! Finds YAML documents.

use super::{collect_files, has_extension};
use crate::exceptions::Exceptions;
use crate::models::package::YAML_SRC;
use crate::models::Package;
use crate::plugins::{DiscoveryPlugin, PluginContext};

pub struct YamlDiscoveryPlugin;

impl DiscoveryPlugin for YamlDiscoveryPlugin {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn scan(
        &self,
        _ctx: &PluginContext,
        package: &mut Package,
        _level: &str,
        exceptions: Option<&Exceptions>,
    ) {
        collect_files(package, exceptions, YAML_SRC, "YAML", |f| {
            has_extension(f, &[".yaml", ".yml"])
        });
    }
}
