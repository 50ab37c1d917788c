//! Configuration loader
//!
//! Loads application configuration from a TOML or JSON file.
//!
//! ## Resolution Order
//! 1. Explicit path passed by the caller
//! 2. `SELLERDESK_CONFIG` environment variable
//! 3. Probing standard locations (see [`probe_config_paths`])
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml`, `./config.json`, `./sellerdesk.toml`, `./sellerdesk.json`
//! 2. `../config.toml` or `../config.json` (parent directory)
//! 3. `../../config.toml` or `../../config.json` (grandparent directory)
//! 4. The same names next to the executable

use std::path::{Path, PathBuf};

use sellerdesk_domain::{Config, Result, SellerDeskError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SELLERDESK_CONFIG";

/// Resolve the config file location without reading it.
///
/// # Errors
/// Returns `SellerDeskError::Config` if an explicit or environment path does
/// not exist, or nothing was found while probing.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path);
    }

    if let Some(value) = std::env::var_os(CONFIG_PATH_ENV).filter(|v| !v.is_empty()) {
        tracing::debug!(env = CONFIG_PATH_ENV, "Using config path from environment");
        return existing(PathBuf::from(value));
    }

    probe_config_paths().ok_or_else(|| {
        SellerDeskError::Config(
            "No config file found in any of the standard locations".to_string(),
        )
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, the path is resolved via [`resolve_config_path`].
/// Format is detected by file extension.
///
/// # Errors
/// Returns `SellerDeskError::Config` if the file is missing, unreadable or
/// invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = resolve_config_path(path)?;
    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| SellerDeskError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `SellerDeskError::Config` if format is invalid or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    match format_of(path)? {
        Format::Toml => toml::from_str(contents)
            .map_err(|e| SellerDeskError::Config(format!("Invalid TOML format: {}", e))),
        Format::Json => serde_json::from_str(contents)
            .map_err(|e| SellerDeskError::Config(format!("Invalid JSON format: {}", e))),
    }
}

/// Render `config` in the format implied by `path`.
///
/// # Errors
/// Returns `SellerDeskError::Config` for unsupported extensions and
/// `SellerDeskError::Internal` if serialization fails.
pub fn serialize_config(config: &Config, path: &Path) -> Result<String> {
    match format_of(path)? {
        Format::Toml => toml::to_string_pretty(config)
            .map_err(|e| SellerDeskError::Internal(format!("Failed to render TOML: {}", e))),
        Format::Json => serde_json::to_string_pretty(config)
            .map_err(|e| SellerDeskError::Internal(format!("Failed to render JSON: {}", e))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.toml"),
        dir.join("config.json"),
        dir.join("sellerdesk.toml"),
        dir.join("sellerdesk.json"),
        dir.join("../config.toml"),
        dir.join("../config.json"),
        dir.join("../../config.toml"),
        dir.join("../../config.json"),
    ]
}

enum Format {
    Toml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match extension {
        "toml" => Ok(Format::Toml),
        "json" => Ok(Format::Json),
        other => Err(SellerDeskError::Config(format!("Unsupported config format: {}", other))),
    }
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(SellerDeskError::Config(format!("Config file not found: {}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const TOML_CONFIG: &str = r#"
[auth]
client_id = "amzn1.application-oa2-client.abc"
client_secret = "secret"
refresh_token = "Atzr|initial"

[marketplace]
marketplace_ids = ["A2EUQ1WTGCTBG2"]

[database]
path = "inventory.db"
pool_size = 2
"#;

    #[test]
    fn test_load_from_file_toml_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, TOML_CONFIG).unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.auth.refresh_token, "Atzr|initial");
        assert_eq!(config.auth.token_endpoint, "https://api.amazon.com/auth/o2/token");
        assert_eq!(config.marketplace.primary(), "A2EUQ1WTGCTBG2");
        assert_eq!(config.database.pool_size, 2);
        assert!(config.ship_from.is_none());
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "auth": {
                "client_id": "id",
                "client_secret": "secret",
                "refresh_token": "Atzr|json",
                "api_endpoint": "sellingpartnerapi-eu.amazon.com"
            },
            "http": { "timeout_seconds": 5 }
        }"#;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sellerdesk.json");
        std::fs::write(&path, json_content).unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.auth.api_endpoint, "sellingpartnerapi-eu.amazon.com");
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.marketplace.primary(), "ATVPDKIKX0DER");
    }

    #[test]
    fn test_env_var_path_used_when_no_explicit_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("from-env.toml");
        std::fs::write(&path, TOML_CONFIG).unwrap();

        std::env::set_var(CONFIG_PATH_ENV, &path);
        let resolved = resolve_config_path(None);
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(resolved.unwrap(), path);
    }

    #[test]
    fn test_explicit_path_wins_over_env() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit.toml");
        std::fs::write(&explicit, TOML_CONFIG).unwrap();

        std::env::set_var(CONFIG_PATH_ENV, dir.path().join("missing.toml"));
        let resolved = resolve_config_path(Some(explicit.clone()));
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(resolved.unwrap(), explicit);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(matches!(result, Err(SellerDeskError::Config(_))), "Should be a Config error");
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "auth": "#, Path::new("config.json"));
        assert!(result.is_err(), "Should fail with invalid JSON");
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", Path::new("config.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_serialize_then_parse_keeps_everything() {
        let config = parse_config(TOML_CONFIG, Path::new("c.toml")).unwrap();
        for name in ["c.toml", "c.json"] {
            let path = Path::new(name);
            let rendered = serialize_config(&config, path).unwrap();
            assert_eq!(parse_config(&rendered, path).unwrap(), config, "{name}");
        }
    }
}
