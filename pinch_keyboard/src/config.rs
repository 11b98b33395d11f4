//! Configuration: TOML file sections with defaults for every field.
//!
//! ```toml
//! [window]
//! width  = 1280
//! height = 720
//!
//! [engine]
//! pinch_threshold = 0.05
//! dwell_ms        = 500
//!
//! [detector]
//! command        = "python3"
//! args           = ["detect_hands.py", "--width", "640", "--height", "480", "--fps", "30", "--max-hands", "1"]
//! min_confidence = 0.7
//!
//! [audio]
//! enabled = true
//!
//! [effects]
//! particle_count = 15
//! ```

use std::path::Path;
use std::time::Duration;

use pinch_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub engine: EngineSection,
    pub detector: DetectorConfig,
    pub audio: AudioConfig,
    pub effects: EffectsConfig,
}

impl AppConfig {
    /// Load and validate a TOML file.  Missing sections and fields take
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window must be non-empty, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.engine.pinch_threshold > 0.0 && self.engine.pinch_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "engine.pinch_threshold must be in (0, 1), got {}",
                self.engine.pinch_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.detector.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "detector.min_confidence must be in [0, 1], got {}",
                self.detector.min_confidence
            )));
        }
        if self.detector.command.trim().is_empty() {
            return Err(ConfigError::Invalid("detector.command is empty".into()));
        }
        if self.audio.channel > 14 {
            // hover and press tones use `channel` and `channel + 1`
            return Err(ConfigError::Invalid(format!(
                "audio.channel must be 0–14, got {}",
                self.audio.channel
            )));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            pinch_threshold: self.engine.pinch_threshold,
            dwell: Duration::from_millis(self.engine.dwell_ms),
            mirror: self.engine.mirror,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    /// Render loop rate cap.
    pub fps: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "Pinch Keyboard".to_string(),
            width: 1280,
            height: 720,
            fps: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub pinch_threshold: f32,
    pub dwell_ms: u64,
    pub mirror: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        let d = EngineConfig::default();
        EngineSection {
            pinch_threshold: d.pinch_threshold,
            dwell_ms: d.dwell.as_millis() as u64,
            mirror: d.mirror,
        }
    }
}

/// External hand detector launched as a subprocess.  It owns the camera and
/// writes landmark NDJSON on stdout.
///
/// No detector ships with this crate.  The default command expects a
/// `detect_hands.py` (e.g. a MediaPipe Hands wrapper) in the working
/// directory that:
///
/// * prints `READY` once the camera is open;
/// * then prints one `{"hands": [{"landmarks": [{"x", "y", "z"} ×21],
///   "handedness", "score"}], "timestamp_ms"}` line per video frame, with
///   coordinates normalized to the image;
/// * prints `{"error": "<reason>"}` and exits if the camera is refused.
///
/// The wire format is `landmark_stream::wire`.  Without a detector the
/// status ends at "Camera Access Denied"; `--source sim` drives the
/// keyboard with the mouse instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Hands scored below this are dropped before reaching the engine.
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            command: "python3".to_string(),
            args: [
                "detect_hands.py", "--width", "640", "--height", "480",
                "--fps", "30", "--max-hands", "1",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_confidence: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Substring of the MIDI output port to prefer.
    pub port_hint: Option<String>,
    /// First of the two MIDI channels used for cues.
    pub channel: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig { enabled: true, port_hint: None, channel: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub press_pulse_ms: u64,
    pub particle_count: usize,
    pub particle_lifetime_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        EffectsConfig {
            press_pulse_ms: 200,
            particle_count: 15,
            particle_lifetime_ms: 800,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = AppConfig::from_toml("[engine]\npinch_threshold = 0.04\n").unwrap();
        assert_eq!(cfg.engine.pinch_threshold, 0.04);
        assert_eq!(cfg.engine.dwell_ms, 500);
        assert!(cfg.engine.mirror);
        assert_eq!(cfg.effects.particle_count, 15);
    }

    #[test]
    fn engine_config_carries_dwell() {
        let cfg = AppConfig::from_toml("[engine]\ndwell_ms = 750\nmirror = false\n").unwrap();
        let e = cfg.engine_config();
        assert_eq!(e.dwell, Duration::from_millis(750));
        assert!(!e.mirror);
    }

    #[test]
    fn zero_threshold_rejected() {
        let err = AppConfig::from_toml("[engine]\npinch_threshold = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_window_rejected() {
        let err = AppConfig::from_toml("[window]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = AppConfig::from_toml("[engine\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detector]\ncommand = \"./hands\"\nargs = []\nmin_confidence = 0.5").unwrap();
        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.detector.command, "./hands");
        assert!(cfg.detector.args.is_empty());
        assert_eq!(cfg.detector.min_confidence, 0.5);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = AppConfig::load(Path::new("/nonexistent/pinch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn defaults_serialize_and_reload() {
        let text = toml::to_string(&AppConfig::default()).unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), AppConfig::default());
    }
}
