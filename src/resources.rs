//! Resource lookup chaining.
//!
//! Documents (`config.yaml`, `profile.yaml`, `exceptions.yaml`) and plugin
//! mapping files are searched in `<path>/rsc/` for each user path in order,
//! then in the bundled `rsc/` directory shipped with the crate.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

const RSC_DIR: &str = "rsc";

#[derive(Debug, Clone)]
pub struct Resources {
    user_paths: Vec<PathBuf>,
    default_path: PathBuf,
}

impl Resources {
    /// Chain `paths` ahead of the bundled resources. Entries that do not
    /// exist or are not directories are logged and dropped.
    pub fn new(paths: &[PathBuf]) -> Self {
        let mut user_paths = Vec::new();
        for path in paths {
            if path.is_dir() {
                let abs = std::path::absolute(path).unwrap_or_else(|_| path.clone());
                debug!("Adding {} to resources path", abs.display());
                user_paths.push(abs);
            } else if path.exists() {
                error!("{} is not a directory and not used as a path", path.display());
            } else {
                error!("Could not find path {}", path.display());
            }
        }
        Self {
            user_paths,
            default_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
        }
    }

    /// Replace the bundled resource root; used by tests and relocatable
    /// installs.
    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_path = path.into();
        self
    }

    /// All search roots, user paths first.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.user_paths
            .iter()
            .map(PathBuf::as_path)
            .chain(std::iter::once(self.default_path.as_path()))
    }

    /// First `<root>/rsc/<filename>` that is a regular file.
    pub fn get_file(&self, filename: &str) -> Option<PathBuf> {
        self.paths().find_map(|root| rsc_file(root, filename))
    }

    /// Like [`Resources::get_file`], restricted to user paths.
    pub fn get_user_file(&self, filename: &str) -> Option<PathBuf> {
        self.user_paths
            .iter()
            .find_map(|root| rsc_file(root, filename))
    }

    /// `filename` in the bundled resources only.
    pub fn get_default_file(&self, filename: &str) -> Option<PathBuf> {
        rsc_file(&self.default_path, filename)
    }

    /// `name` itself when it points at an existing file, else the resource
    /// lookup of `name`.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(direct.to_path_buf());
        }
        self.get_file(name)
    }
}

fn rsc_file(root: &Path, filename: &str) -> Option<PathBuf> {
    let full = root.join(RSC_DIR).join(filename);
    full.is_file().then_some(full)
}
