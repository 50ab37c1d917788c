//! Configuration loading and persistence

pub mod loader;
pub mod store;

pub use loader::{load_from_file, parse_config, probe_config_paths, resolve_config_path};
pub use store::ConfigStore;
