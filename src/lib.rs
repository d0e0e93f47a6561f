//! lintherd core library.
//!
//! This crate exposes programmatic APIs for scanning source packages with a
//! configurable set of external linters. A level (from YAML config, with
//! inheritance) selects which plugins run, exceptions filter the issues,
//! and reporting plugins render the result.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Level resolution engine over the YAML level documents.
//! - `exceptions`: File, regex and NOLINT issue filtering.
//! - `profile`: Package to level mapping.
//! - `settings`: `lintherd.toml` discovery and effective settings.
//! - `resources`: Resource lookup across user paths and bundled files.
//! - `plugins`: Discovery, tool and reporting plugin traits and built-ins.
//! - `scan`: Orchestration of one package or a whole workspace.
//! - `models`: Issues, packages and document schemas.
//! - `error`: Typed errors.
//! - `logging`: Tracing subscriber setup.
//! - `utils`: Supporting helpers.
pub mod cli;
pub mod config;
pub mod error;
pub mod exceptions;
pub mod logging;
pub mod models;
pub mod plugins;
pub mod profile;
pub mod resources;
pub mod scan;
pub mod settings;
pub mod utils;
