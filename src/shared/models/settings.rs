use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_PATH_VARIABLE: &str = "TASK_API_SETTINGS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    pub jwt_expiration_in_minutes: i64,
    pub default_admin_username: String,
    pub default_admin_password: String,
    pub default_admin_email: String,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_max_page_size() -> usize {
    100
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot parse JSON content from file {path}: {source}")]
    Parse { path: String, source: serde_json::Error },
}

impl Settings {
    /// Loads `settings.json` from the working directory, or from the path in
    /// `TASK_API_SETTINGS` when that is set.
    pub fn load() -> Result<Settings, SettingsError> {
        let path = env::var(SETTINGS_PATH_VARIABLE).unwrap_or_else(|_| SETTINGS_FILENAME.to_string());
        Settings::from_file(&path)
    }

    pub fn from_file(path: &str) -> Result<Settings, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_string(),
            source,
        })?;
        Settings::from_json(&content).map_err(|source| SettingsError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(content)
    }
}
