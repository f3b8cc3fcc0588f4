// src/config.rs
use anyhow::{ensure, Context, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandTrackingConfig {
    /// Pinch strength at or above which a finger counts as pinching.
    pub pinch_threshold: f32,
    /// Tracking confidence at or above which a finger or hand is high confidence.
    pub high_confidence_threshold: f32,
    /// Seconds between simulated frames.
    pub frame_interval: f64,
    /// Seconds between simulated tracking dropouts; 0 disables them.
    pub dropout_period: f64,
    pub dropout_duration: f64,
    /// Palm center shift in wrist space, right-hand convention.
    pub palm_offset: [f32; 3],
    /// Pointer origin relative to the wrist, right-hand convention.
    pub pointer_offset: [f32; 3],
    pub enable_kalman: bool,
    /// Frames kept by a recorder; 0 keeps everything.
    pub max_recorded_frames: usize,
    pub output_directory: PathBuf,
}

impl Default for HandTrackingConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.8,
            high_confidence_threshold: 0.7,
            frame_interval: 0.033,
            dropout_period: 10.0,
            dropout_duration: 1.0,
            palm_offset: [0.0, -0.01, 0.0],
            pointer_offset: [0.0, 0.0, 0.06],
            enable_kalman: true,
            max_recorded_frames: 0,
            output_directory: directories::UserDirs::new()
                .and_then(|dirs| dirs.document_dir().map(|p| p.join("HandState")))
                .unwrap_or_else(|| PathBuf::from("./output")),
        }
    }
}

impl HandTrackingConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        tracing::info!("Loaded hand tracking config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            (0.0..=1.0).contains(&self.pinch_threshold),
            "pinch_threshold must lie in [0, 1], got {}",
            self.pinch_threshold
        );
        ensure!(
            (0.0..=1.0).contains(&self.high_confidence_threshold),
            "high_confidence_threshold must lie in [0, 1], got {}",
            self.high_confidence_threshold
        );
        ensure!(
            self.frame_interval > 0.0,
            "frame_interval must be positive, got {}",
            self.frame_interval
        );
        ensure!(
            self.dropout_period >= 0.0 && self.dropout_duration >= 0.0,
            "dropout timings must not be negative"
        );
        ensure!(
            self.dropout_period == 0.0 || self.dropout_duration < self.dropout_period,
            "dropout_duration must be shorter than dropout_period"
        );
        Ok(())
    }

    pub fn palm_offset(&self) -> Vector3<f32> {
        Vector3::from(self.palm_offset)
    }

    pub fn pointer_offset(&self) -> Vector3<f32> {
        Vector3::from(self.pointer_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(HandTrackingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "pinch_threshold": 0.9, "dropout_period": 0.0 }}"#).unwrap();

        let config = HandTrackingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pinch_threshold, 0.9);
        assert_eq!(config.dropout_period, 0.0);
        assert_eq!(config.frame_interval, 0.033);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "pinch_threshold": 1.5 }}"#).unwrap();

        let err = HandTrackingConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("pinch_threshold"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(HandTrackingConfig::from_file("/nonexistent/hand_state.json").is_err());
    }

    #[test]
    fn test_dropout_must_be_shorter_than_period() {
        let config = HandTrackingConfig {
            dropout_period: 2.0,
            dropout_duration: 2.0,
            ..HandTrackingConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dropout_duration"));

        let disabled = HandTrackingConfig {
            dropout_period: 0.0,
            dropout_duration: 5.0,
            ..HandTrackingConfig::default()
        };
        assert!(disabled.validate().is_ok());
    }
}
