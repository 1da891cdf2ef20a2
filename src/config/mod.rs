// src/config/mod.rs

//! Configuration for tugbot.
//!
//! - [`model`] is the TOML data model.
//! - [`loader`] reads a file from disk.
//! - [`validate`] turns the raw model into a checked [`ConfigFile`].
//! - [`resolve`] layers CLI flags and environment on top.

pub mod loader;
pub mod model;
pub mod resolve;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, RawConfigFile, DEFAULT_ENGINE_HOST, DEFAULT_TICK_INTERVAL};
pub use resolve::{process_env, resolve, Overrides, Settings};
pub use validate::validate_host;
