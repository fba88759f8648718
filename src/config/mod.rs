use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

pub const API_URL_ENV: &str = "HOSTEL_ADMIN_API_URL";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(alias = "base_url")]
    pub api_url: Option<String>,
    pub session_file: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub page_size: Option<usize>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

fn app_dir() -> Option<PathBuf> {
    Some(home_dir()?.join(".hostel-admin"))
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(app_dir()?.join("config.yml"))
}

pub fn default_session_path() -> PathBuf {
    app_dir()
        .unwrap_or_else(|| PathBuf::from(".hostel-admin"))
        .join("session.json")
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// API URL from the environment, ignoring blank values.
pub fn env_api_url() -> Option<String> {
    env::var(API_URL_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) if contents.trim().is_empty() => Ok(ConfigFile::default()),
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# hostel-admin config
#
# Location (default):
#   ~/.hostel-admin/config.yml
#
# Precedence: command-line flag > environment > this file > built-in default.

# Hostel API base URL (env: HOSTEL_ADMIN_API_URL)
api_url: http://127.0.0.1:8000

# Where tokens, the cached profile and pending OTP/reset state are kept
session_file: ~/.hostel-admin/session.json

# HTTP
timeout: 10
# proxy: http://127.0.0.1:8080

# Screens: rows per page (5, 10, 20, 50, 100, 150 or 200)
page_size: 5

# Output styling
no_color: false
"#
    .to_string()
}

/// Writes the commented default config unless a file is already there.
/// Returns whether a file was created.
pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    log::info!("wrote default config to {}", path.display());
    Ok(true)
}
