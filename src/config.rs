use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::SlipstreamError;
use crate::laps::DEFAULT_OUTLIER_FACTOR;

const CONFIG_DIR_NAME: &str = "slipstream";
const CONFIG_FILE_NAME: &str = "config.json";

/// Earliest season with lap telemetry available
pub const FIRST_SEASON: i32 = 2018;
pub const DEFAULT_MINI_SECTORS: usize = 25;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Laps at or above `median * outlier_factor` are outliers
    pub outlier_factor: f64,
    pub first_season: i32,
    /// Root of the file-based lap data, used when no directory is given on the command line
    pub data_dir: Option<PathBuf>,
    pub mini_sectors: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            outlier_factor: DEFAULT_OUTLIER_FACTOR,
            first_season: FIRST_SEASON,
            data_dir: None,
            mini_sectors: DEFAULT_MINI_SECTORS,
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, SlipstreamError> {
        Ok(dirs::config_dir()
            .ok_or(SlipstreamError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    pub fn from_local_file() -> Result<Option<Self>, SlipstreamError> {
        Self::from_file(&Self::default_path()?)
    }

    pub fn from_file(config_path: &Path) -> Result<Option<Self>, SlipstreamError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| SlipstreamError::ConfigIOError { source: e })?;
        let config = serde_json::from_reader(file)
            .map_err(|e| SlipstreamError::ConfigSerializeError { source: e })?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<(), SlipstreamError> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), SlipstreamError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SlipstreamError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| SlipstreamError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| SlipstreamError::ConfigSerializeError { source: e })
    }

    /// Seasons to offer, newest first
    pub fn seasons(&self) -> Vec<i32> {
        let current_year = chrono::Local::now().year();
        (self.first_season..=current_year).rev().collect()
    }
}
