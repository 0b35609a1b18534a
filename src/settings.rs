use config::{Config, ConfigError, File as ConfigFile};
use serde_derive::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

use crate::errors::AppError;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageSettings {
    pub data_file: String,
    pub retention_days: i64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GraphSettings {
    pub pulse_enabled: bool,
    pub max_x_labels: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ExportSettings {
    /// Empty means the working directory.
    pub dir: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct MiscSettings {
    log_level: String,
    pub use_12hr_time: bool,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub graph: GraphSettings,
    pub export: ExportSettings,
    pub misc: MiscSettings,
}

/// The config file sits next to the executable unless overridden.
pub fn resolve_config_path(config_override: Option<&Path>) -> PathBuf {
    match config_override {
        Some(path) => path.to_path_buf(),
        None => {
            let exe_path = env::current_exe().expect("Failed to get executable path");
            exe_path.with_extension("toml")
        }
    }
}

impl Settings {
    pub fn load(config_path: &Path, required: bool) -> Result<Self, ConfigError> {
        let default_log_level = if cfg!(debug_assertions) {
            "debug"
        } else {
            "info"
        };

        let s = Config::builder()
            .add_source(ConfigFile::from(config_path.to_path_buf()).required(required))
            .set_default("storage.data_file", "sessions.json")?
            .set_default("storage.retention_days", 30)?
            .set_default("graph.pulse_enabled", true)?
            .set_default("graph.max_x_labels", 5)?
            .set_default("export.dir", "")?
            .set_default("misc.log_level", default_log_level)?
            .set_default("misc.use_12hr_time", true)?
            .build()?;

        s.try_deserialize()
    }

    pub fn save(&self, config_path: &Path) -> Result<(), AppError> {
        let toml_string = toml::to_string(self)?;
        let mut file = File::create(config_path).map_err(|e| AppError::CreateFile {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    pub fn get_log_level(&self) -> LevelFilter {
        match self.misc.log_level.to_lowercase().as_str() {
            "off" => LevelFilter::OFF,
            "error" => LevelFilter::ERROR,
            "warn" => LevelFilter::WARN,
            "info" => LevelFilter::INFO,
            "debug" => LevelFilter::DEBUG,
            "trace" => LevelFilter::TRACE,
            _ => LevelFilter::INFO,
        }
    }
}
