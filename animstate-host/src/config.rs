//! Host configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via ANIMSTATE_CONFIG)
//! 3. Environment variables

use animstate_core::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Host configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph to load.
    pub graph: GraphConfig,
    /// Frame pulse settings.
    pub frame: FrameConfig,
    /// Triggers to fire at fixed frames.
    pub script: Vec<ScriptedTrigger>,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ANIMSTATE_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Loads configuration from environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        self.graph.apply_env_overrides();
        self.frame.apply_env_overrides();
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.frame.validate()?;

        for entry in &self.script {
            if entry.trigger.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "script entry at frame {} has an empty trigger",
                    entry.frame
                )));
            }
        }

        Ok(())
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }
}

/// Graph source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Path to the JSON document.
    pub path: PathBuf,
    /// Layout of the document.
    pub dialect: Dialect,
    /// State to start in. Falls back to the graph's default state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./graph.json"),
            dialect: Dialect::Native,
            initial_state: None,
        }
    }
}

impl GraphConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("ANIMSTATE_GRAPH") {
            self.path = PathBuf::from(path);
        }

        if let Ok(dialect) = std::env::var("ANIMSTATE_DIALECT") {
            self.dialect = match dialect.to_lowercase().as_str() {
                "unity" => Dialect::Unity,
                _ => Dialect::Native,
            };
        }

        if let Ok(state) = std::env::var("ANIMSTATE_INITIAL_STATE") {
            if !state.is_empty() {
                self.initial_state = Some(state);
            }
        }
    }
}

/// Frame pulse configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frames per second.
    pub rate_hz: u32,
    /// Stop after this many frames (0 = run until shutdown).
    pub max_frames: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            rate_hz: 60,
            max_frames: 0,
        }
    }
}

impl FrameConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(rate) = std::env::var("ANIMSTATE_FRAME_RATE") {
            if let Ok(hz) = rate.parse() {
                self.rate_hz = hz;
            }
        }

        if let Ok(max) = std::env::var("ANIMSTATE_MAX_FRAMES") {
            if let Ok(n) = max.parse() {
                self.max_frames = n;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_hz == 0 {
            return Err(ConfigError::ValidationError(
                "frame.rate_hz must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the wall-clock length of one frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_nanos((1_000_000_000 / u64::from(self.rate_hz.max(1))).max(1))
    }

    /// Returns the delta time passed to each tick, in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.rate_hz.max(1) as f32
    }

    /// Returns whether the pulse stops on its own.
    pub fn is_bounded(&self) -> bool {
        self.max_frames > 0
    }
}

/// A trigger fired by the host on a given frame (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedTrigger {
    pub frame: u64,
    pub trigger: String,
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.graph.path, PathBuf::from("./graph.json"));
        assert_eq!(config.graph.dialect, Dialect::Native);
        assert_eq!(config.frame.rate_hz, 60);
        assert!(!config.frame.is_bounded());
        assert!(config.script.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_frame_timing() {
        let frame = FrameConfig {
            rate_hz: 50,
            max_frames: 10,
        };
        assert_eq!(frame.frame_interval(), Duration::from_millis(20));
        assert_eq!(frame.delta_time(), 0.02);
        assert!(frame.is_bounded());
    }

    #[test]
    fn test_zero_rate_rejected() {
        let mut config = Config::default();
        config.frame.rate_hz = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_script_trigger_rejected() {
        let mut config = Config::default();
        config.script.push(ScriptedTrigger {
            frame: 3,
            trigger: String::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("host.yaml");
        std::fs::write(
            &path,
            r#"
graph:
  path: assets/door.json
  dialect: unity
  initial_state: Locked
frame:
  rate_hz: 30
  max_frames: 90
script:
  - frame: 10
    trigger: Closed
  - frame: 20
    trigger: Opened
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.graph.path, PathBuf::from("assets/door.json"));
        assert_eq!(config.graph.dialect, Dialect::Unity);
        assert_eq!(config.graph.initial_state.as_deref(), Some("Locked"));
        assert_eq!(config.frame.rate_hz, 30);
        assert_eq!(config.frame.max_frames, 90);
        assert_eq!(config.script.len(), 2);
        assert_eq!(config.script[1].trigger, "Opened");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/animstate.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(..)));
    }

    #[test]
    fn test_load_fails_on_unreadable_config_file() {
        // the only environment test in this crate, so no other test races it
        std::env::set_var("ANIMSTATE_CONFIG", "/nonexistent/animstate.yaml");
        let result = Config::load();
        std::env::remove_var("ANIMSTATE_CONFIG");

        assert!(matches!(result, Err(ConfigError::IoError(..))));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("host.yaml");

        let mut config = Config::default();
        config.graph.dialect = Dialect::Unity;
        config.script.push(ScriptedTrigger {
            frame: 1,
            trigger: "run".to_string(),
        });
        config.save(&path).unwrap();

        let parsed = Config::from_file(&path).unwrap();
        assert_eq!(parsed.graph.dialect, Dialect::Unity);
        assert_eq!(parsed.script, config.script);
    }
}
