use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::face_locator::CascadeParams;
use crate::pipeline::emotion_signal_use_case::PipelineSettings;

use super::constants::{DEFAULT_CAMERA_INDEX, DEFAULT_ENDPOINT, DEFAULT_SNAPSHOT_URL};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Process-wide settings, fixed once the pipeline starts.
///
/// Loaded from an optional JSON file; every field has a default so a
/// partial file (or none at all) is valid. Command-line flags are applied
/// on top by the binary before [`AppConfig::validate`] runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Receiver host, optionally with `:port`.
    pub endpoint: String,
    pub snapshot_url: String,
    pub camera_index: i32,
    pub cascade: CascadeParams,
    pub cascade_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    /// Classify the luminance crop replicated to RGB instead of the colour crop.
    pub grayscale_faces: bool,
    /// Fixed value of the arming gate.
    pub armed: bool,
    pub headless: bool,
    pub max_frames: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            snapshot_url: DEFAULT_SNAPSHOT_URL.to_string(),
            camera_index: DEFAULT_CAMERA_INDEX,
            cascade: CascadeParams::default(),
            cascade_path: None,
            model_path: None,
            grayscale_faces: true,
            armed: true,
            headless: false,
            max_frames: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        if endpoint.contains("://") || endpoint.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "endpoint must be a host or host:port, got '{endpoint}'"
            )));
        }
        match reqwest::Url::parse(&self.snapshot_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "snapshot URL must be an http(s) URL, got '{}'",
                    self.snapshot_url
                )))
            }
        }
        if self.camera_index < 0 {
            return Err(ConfigError::Invalid(format!(
                "camera index must be non-negative, got {}",
                self.camera_index
            )));
        }
        self.cascade.validate().map_err(ConfigError::Invalid)?;
        if self.max_frames == Some(0) {
            return Err(ConfigError::Invalid("max frames must be at least 1".into()));
        }
        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            grayscale_faces: self.grayscale_faces,
            max_frames: self.max_frames,
        }
    }
}
