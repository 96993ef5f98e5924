//! Configuration file support.
//!
//! Holds the engine defaults a host may want to persist: log verbosity, tool
//! styles, zoom factors and undo depth.

use serde::{Deserialize, Serialize};

use crate::constants::{self, DEFAULT_UNDO_DEPTH, freehand, text, zoom};
use crate::model::{Color, ToolStyles};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub tools: ToolDefaults,

    #[serde(default)]
    pub zoom: ZoomConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Default styles applied when an image is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    pub freehand_color: Color,
    pub freehand_width: f32,
    pub text_color: Color,
    pub text_font_size: f32,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            freehand_color: constants::DEFAULT_FREEHAND_COLOR,
            freehand_width: freehand::DEFAULT_WIDTH,
            text_color: constants::DEFAULT_TEXT_COLOR,
            text_font_size: text::DEFAULT_FONT_SIZE,
        }
    }
}

impl ToolDefaults {
    /// Build tool styles, clamping widths and sizes into their valid ranges.
    pub fn to_styles(&self) -> ToolStyles {
        let mut styles = ToolStyles {
            freehand_color: self.freehand_color,
            text_color: self.text_color,
            ..ToolStyles::default()
        };
        styles.set_freehand_width(self.freehand_width);
        styles.set_text_font_size(self.text_font_size);
        styles
    }
}

/// Zoom step factors for buttons and the mouse wheel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub step_factor: f32,
    pub wheel_factor: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step_factor: zoom::STEP_FACTOR,
            wheel_factor: zoom::WHEEL_FACTOR,
        }
    }
}

impl ZoomConfig {
    /// Replace factors that would not zoom (≤ 1 or non-finite) with the defaults.
    pub fn sanitized(&self) -> ZoomConfig {
        let pick = |value: f32, fallback: f32| {
            if value.is_finite() && value > 1.0 {
                value
            } else {
                log::warn!("Invalid zoom factor {value}, using {fallback}");
                fallback
            }
        };
        ZoomConfig {
            step_factor: pick(self.step_factor, zoom::STEP_FACTOR),
            wheel_factor: pick(self.wheel_factor, zoom::WHEEL_FACTOR),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            tools: ToolDefaults::default(),
            zoom: ZoomConfig::default(),
            history: HistoryConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path for auto-load/save.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("xray-annotate").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("xray-annotate")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }
        Self::load_from(&path)
            .map_err(|e| log::warn!("Failed to load config file {:?}: {}", path, e))
            .ok()
    }

    /// Load configuration from an explicit path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = EngineConfig::new();
        config.preferences.log_level = LogLevel::Debug;
        config.tools.freehand_color = Color::rgb(0, 0, 255);
        config.history.max_depth = 5;

        let json = config.to_json().unwrap();
        let loaded = EngineConfig::from_json(&json).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let loaded = EngineConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        let err = EngineConfig::from_json(&json).unwrap_err();
        assert!(matches!(err, ConfigError::VersionTooNew { .. }));
    }

    #[test]
    fn test_tool_defaults_are_clamped() {
        let defaults = ToolDefaults {
            freehand_width: 500.0,
            text_font_size: 1.0,
            ..ToolDefaults::default()
        };
        let styles = defaults.to_styles();
        assert_eq!(styles.freehand_width, freehand::MAX_WIDTH);
        assert_eq!(styles.text_font_size, text::MIN_FONT_SIZE);
    }

    #[test]
    fn test_log_level_parsing() {
        let json = r#"{ "version": 1, "preferences": { "log_level": "trace" } }"#;
        let loaded = EngineConfig::from_json(json).unwrap();
        assert_eq!(
            loaded.preferences.log_level.to_level_filter(),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_zoom_factors_sanitized() {
        let zoom = ZoomConfig {
            step_factor: 0.5,
            wheel_factor: f32::NAN,
        }
        .sanitized();
        assert_eq!(zoom, ZoomConfig::default());
    }
}
