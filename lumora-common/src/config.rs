//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "LUMORA_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "lumora.db";

/// Contents of `config.toml`
///
/// Every field is optional; absent values fall back to CLI/env or defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    #[serde(default)]
    pub ai: AiConfig,
}

/// `[ai]` table: chat completion provider settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// Load the TOML config
///
/// An explicit `path` must exist and parse. Without one, the platform config
/// locations are tried and a missing file yields the default (empty) config.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match find_config_file() {
            Some(p) => p,
            None => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root_folder) = toml_config.root_folder.as_deref() {
        return PathBuf::from(root_folder);
    }

    default_root_folder()
}

/// Database path for a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Locate the config file for the platform
///
/// Linux tries `~/.config/lumora/config.toml` then `/etc/lumora/config.toml`;
/// other platforms use the user config directory only.
fn find_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("lumora").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/lumora/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/lumora (or /var/lib/lumora for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("lumora"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/lumora"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("lumora"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/lumora"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("lumora"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\lumora"))
    } else {
        PathBuf::from("./lumora_data")
    }
}
