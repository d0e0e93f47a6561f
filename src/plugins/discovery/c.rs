//! Finds C and C++ sources and headers.

use super::{collect_files, file_output_mentions, has_extension};
use crate::exceptions::Exceptions;
use crate::models::package::C_SRC;
use crate::models::Package;
use crate::plugins::{DiscoveryPlugin, PluginContext};

const C_EXTENSIONS: &[&str] = &[".c", ".cc", ".cpp", ".cxx", ".h", ".hxx", ".hpp"];
const C_OUTPUT: &[&str] = &["c source", "c program", "c++ source"];

pub struct CDiscoveryPlugin;

impl DiscoveryPlugin for CDiscoveryPlugin {
    fn name(&self) -> &'static str {
        "c"
    }

    fn scan(
        &self,
        _ctx: &PluginContext,
        package: &mut Package,
        _level: &str,
        exceptions: Option<&Exceptions>,
    ) {
        collect_files(package, exceptions, C_SRC, "C/C++", |f| {
            has_extension(f, C_EXTENSIONS)
                || (file_output_mentions(f, C_OUTPUT) && !f.name.ends_with(".cfg"))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::context;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_finds_sources_and_headers() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("main.cpp"), "int main() {}\n").unwrap();
        fs::write(dir.path().join("include/util.h"), "").unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), "").unwrap();
        let mut pkg = Package::from_path(dir.path());
        CDiscoveryPlugin.scan(&context(), &mut pkg, "lint", None);
        assert_eq!(pkg.c_src().len(), 2);
    }
}
