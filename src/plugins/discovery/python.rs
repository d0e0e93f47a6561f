//! Finds Python sources by extension or `file` sniffing.

use super::{collect_files, file_output_mentions, has_extension};
use crate::exceptions::Exceptions;
use crate::models::package::PYTHON_SRC;
use crate::models::Package;
use crate::plugins::{DiscoveryPlugin, PluginContext};

pub struct PythonDiscoveryPlugin;

impl DiscoveryPlugin for PythonDiscoveryPlugin {
    fn name(&self) -> &'static str {
        "python"
    }

    fn scan(
        &self,
        _ctx: &PluginContext,
        package: &mut Package,
        _level: &str,
        exceptions: Option<&Exceptions>,
    ) {
        collect_files(package, exceptions, PYTHON_SRC, "python", |f| {
            has_extension(f, &[".py"])
                || (file_output_mentions(f, &["python script"]) && !f.name.ends_with(".cfg"))
        });
    }
}
