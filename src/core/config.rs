//! Settings file parsing and validation.
//!
//! The settings file is optional YAML. Every key has a default, so an empty
//! file (or none at all) is valid:
//! - `api_url` / `ipxe_url` must be http(s) URLs
//! - `api_key` / `project_id` must not be blank when present

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Packet API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.packet.net";

/// iPXE script that boots the VIRL installer.
pub const DEFAULT_IPXE_URL: &str = "http://packet.virl.info";

/// Env var naming the settings file when `--config` is not given.
pub const CONFIG_ENV: &str = "VIRL_PACKET_CONFIG";

/// Tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL of the Packet API
    pub api_url: String,

    /// iPXE script URL passed to new devices
    pub ipxe_url: String,

    /// Default API token
    pub api_key: Option<String>,

    /// Default project for `deploy`
    pub project_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ipxe_url: DEFAULT_IPXE_URL.to_string(),
            api_key: None,
            project_id: None,
        }
    }
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a settings file from disk.
pub fn parse_settings_file(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_settings(&content)
}

/// Parse settings from a string. An empty document yields the defaults.
pub fn parse_settings(yaml: &str) -> Result<Settings, String> {
    if yaml.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate parsed settings. Returns a list of errors (empty = valid).
pub fn validate_settings(settings: &Settings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, url) in [("api_url", &settings.api_url), ("ipxe_url", &settings.ipxe_url)] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ValidationError {
                message: format!("{} must be an http(s) URL, got \"{}\"", key, url),
            });
        }
    }

    for (key, value) in [
        ("api_key", &settings.api_key),
        ("project_id", &settings.project_id),
    ] {
        if let Some(v) = value {
            if v.trim().is_empty() {
                errors.push(ValidationError {
                    message: format!("{} must not be blank", key),
                });
            }
        }
    }

    errors
}

/// Load settings from `explicit`, else from `$VIRL_PACKET_CONFIG`, else defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, String> {
    let from_env = std::env::var_os(CONFIG_ENV).map(std::path::PathBuf::from);
    let path = explicit.map(Path::to_path_buf).or(from_env);

    let settings = match path {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading settings");
            parse_settings_file(&p)?
        }
        None => Settings::default(),
    };

    let errors = validate_settings(&settings);
    if errors.is_empty() {
        return Ok(settings);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{} settings error(s)", errors.len()))
}
