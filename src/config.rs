use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CpFitError, Result};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// Test protocol settings
    pub protocol: ProtocolSettings,

    /// Depletion target settings
    pub depletion: DepletionSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Timed-effort protocol used for the fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSettings {
    /// Effort durations in seconds, one per mean-power input
    pub durations_s: Vec<f64>,
}

/// Depletion targets derived after each fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepletionSettings {
    /// W' fractions to compute target powers for
    pub fractions: Vec<f64>,

    /// Effort duration the targets are computed over, in seconds
    pub duration_s: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            // 3 / 5 / 12-minute test protocol
            protocol: ProtocolSettings {
                durations_s: vec![180.0, 300.0, 720.0],
            },
            depletion: DepletionSettings {
                fractions: vec![0.70, 0.30],
                duration_s: 180.0,
            },
        }
    }
}

impl AppConfig {
    /// Default config file path under the platform config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cpfit")
            .join("config.toml")
    }

    /// Load configuration from a file, falling back to defaults if it
    /// does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| CpFitError::Configuration(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut to_save = self.clone();
        to_save.metadata.updated_at = Utc::now();

        let content = toml::to_string_pretty(&to_save)
            .map_err(|e| CpFitError::Configuration(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate protocol and depletion settings
    pub fn validate(&self) -> Result<()> {
        if self.protocol.durations_s.len() < 2 {
            return Err(CpFitError::Configuration(
                "protocol needs at least 2 effort durations".to_string(),
            ));
        }
        if self.protocol.durations_s.iter().any(|&t| t <= 0.0 || !t.is_finite()) {
            return Err(CpFitError::Configuration(
                "protocol durations must be finite and > 0 seconds".to_string(),
            ));
        }
        if self.depletion.duration_s <= 0.0 || !self.depletion.duration_s.is_finite() {
            return Err(CpFitError::Configuration(
                "depletion duration must be finite and > 0 seconds".to_string(),
            ));
        }
        if self.depletion.fractions.iter().any(|&f| f < 0.0 || !f.is_finite()) {
            return Err(CpFitError::Configuration(
                "depletion fractions must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
