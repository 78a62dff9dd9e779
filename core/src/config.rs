//! Configuration loading.
//!
//! The data directory holds the board files, the log file and an optional
//! `config.toml`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::task::Priority;

pub const DATA_DIR_ENV: &str = "TASKBOARD_DATA_DIR";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOG_FILE_NAME: &str = "taskboard.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Priority preselected in the new-task form.
    #[serde(default)]
    pub default_priority: Priority,
}

impl Config {
    /// Resolves the data directory (explicit path, else `~/.taskboard`) and
    /// reads `config.toml` from it when present.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let mut config = read_config_file(&data_dir.join(CONFIG_FILE_NAME))?;
        config.data_dir = data_dir;
        Ok(config)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".taskboard"))
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(Config {
                data_dir: PathBuf::new(),
                default_priority: Priority::default(),
            })
        }
        Err(e) => return Err(e).with_context(|| format!("Could not read {}", path.display())),
    };
    toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))
}
