use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::easing::Ease;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub preloader: PreloaderConfig,
    #[serde(default)]
    pub choreography: ChoreographyConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Shared frame clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Frames per second for the real-time driver
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Clamp long frame gaps (trades responsiveness for smoothness)
    #[serde(default)]
    pub lag_smoothing: bool,
    /// Gap in milliseconds above which a frame counts as lagging
    #[serde(default = "default_lag_threshold_ms")]
    pub lag_threshold_ms: u64,
    /// Delta in milliseconds reported for a lagging frame
    #[serde(default = "default_adjusted_lag_ms")]
    pub adjusted_lag_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            lag_smoothing: false,
            lag_threshold_ms: default_lag_threshold_ms(),
            adjusted_lag_ms: default_adjusted_lag_ms(),
        }
    }
}

/// Smooth scrolling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Enable smooth scrolling; when off, wheel input moves the page at once
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Fraction of the remaining distance covered per 60 Hz frame
    #[serde(default = "default_lerp")]
    pub lerp: f64,
    /// Fixed-duration mode in milliseconds; 0 uses `lerp` instead
    #[serde(default)]
    pub duration_ms: u64,
    /// Curve for fixed-duration mode
    #[serde(default = "default_scroll_easing")]
    pub easing: Ease,
    /// Multiplier applied to raw wheel deltas
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            lerp: default_lerp(),
            duration_ms: 0,
            easing: default_scroll_easing(),
            wheel_multiplier: default_wheel_multiplier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloaderConfig {
    /// Seconds before the master timeline starts
    #[serde(default = "default_preloader_delay")]
    pub delay: f64,
    /// Total seconds of the progress bar fill
    #[serde(default = "default_progress_duration")]
    pub progress_duration: f64,
    /// Number of discrete fill steps
    #[serde(default = "default_progress_steps")]
    pub progress_steps: usize,
    /// Smallest random increment per step
    #[serde(default = "default_increment_min")]
    pub increment_min: f64,
    /// Width of the random increment range
    #[serde(default = "default_increment_range")]
    pub increment_range: f64,
    /// Ceiling for every step but the last
    #[serde(default = "default_increment_cap")]
    pub increment_cap: f64,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            delay: default_preloader_delay(),
            progress_duration: default_progress_duration(),
            progress_steps: default_progress_steps(),
            increment_min: default_increment_min(),
            increment_range: default_increment_range(),
            increment_cap: default_increment_cap(),
        }
    }
}

/// When a non-last card stops being pinned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinRelease {
    /// As soon as the next card covers it
    #[default]
    Next,
    /// When the last card reaches the top
    Last,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoreographyConfig {
    /// Scroll distance of the intro zoom, in viewport heights
    #[serde(default = "default_intro_distance_vh")]
    pub intro_distance_vh: f64,
    /// Extra pinned distance for the last card, in viewport heights
    #[serde(default = "default_last_pin_vh")]
    pub last_pin_vh: f64,
    #[serde(default)]
    pub release_pin: PinRelease,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            intro_distance_vh: default_intro_distance_vh(),
            last_pin_vh: default_last_pin_vh(),
            release_pin: PinRelease::default(),
        }
    }
}

/// Shape of the built-in landing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Line box width used when splitting text into lines
    #[serde(default = "default_line_width")]
    pub line_width: usize,
    /// One card per title, in page order
    #[serde(default = "default_card_titles")]
    pub card_titles: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            line_width: default_line_width(),
            card_titles: default_card_titles(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_fps() -> u32 {
    60
}

fn default_lag_threshold_ms() -> u64 {
    500
}

fn default_adjusted_lag_ms() -> u64 {
    33
}

fn default_lerp() -> f64 {
    0.1
}

fn default_scroll_easing() -> Ease {
    Ease::POWER3_OUT
}

fn default_wheel_multiplier() -> f64 {
    1.0
}

fn default_preloader_delay() -> f64 {
    0.5
}

fn default_progress_duration() -> f64 {
    4.0
}

fn default_progress_steps() -> usize {
    5
}

fn default_increment_min() -> f64 {
    0.1
}

fn default_increment_range() -> f64 {
    0.3
}

fn default_increment_cap() -> f64 {
    0.9
}

fn default_intro_distance_vh() -> f64 {
    3.0
}

fn default_last_pin_vh() -> f64 {
    1.0
}

fn default_viewport_width() -> f64 {
    1440.0
}

fn default_viewport_height() -> f64 {
    900.0
}

fn default_line_width() -> usize {
    48
}

fn default_card_titles() -> Vec<String> {
    ["Aurora", "Drift", "Vessel", "Ember"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, defaults if it is missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the sequencer cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.preloader.progress_steps == 0 {
            return Err(crate::Error::Config(
                "preloader.progress_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<PathBuf> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(config_path)
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollreel/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollreel")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.ticker.lag_smoothing);
        assert_eq!(config.preloader.progress_steps, 5);
        assert_eq!(config.preloader.progress_duration, 4.0);
        assert_eq!(config.choreography.intro_distance_vh, 3.0);
        assert_eq!(config.choreography.release_pin, PinRelease::Next);
        assert_eq!(config.page.card_titles.len(), 4);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [scroll]
            lerp = 0.2
            easing = "power2.out"

            [choreography]
            release_pin = "last"
            "#,
        )
        .unwrap();
        assert_eq!(config.scroll.lerp, 0.2);
        assert_eq!(config.scroll.easing, Ease::POWER2_OUT);
        assert!(config.scroll.smooth_enabled);
        assert_eq!(config.choreography.release_pin, PinRelease::Last);
        assert_eq!(config.preloader.delay, 0.5);
    }

    #[test]
    fn test_bad_ease_is_config_error() {
        let err = AppConfig::from_toml("[scroll]\neasing = \"wobble\"\n");
        assert!(matches!(err, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_zero_progress_steps_rejected() {
        let err = AppConfig::from_toml("[preloader]\nprogress_steps = 0\n");
        assert!(matches!(err, Err(crate::Error::Config(msg)) if msg.contains("progress_steps")));
        assert!(AppConfig::from_toml("[preloader]\nprogress_steps = 1\n").is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let back = AppConfig::from_toml(&text).unwrap();
        assert_eq!(back.page.card_titles, config.page.card_titles);
        assert_eq!(back.scroll.easing, config.scroll.easing);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/scrollreel.toml")).unwrap();
        assert_eq!(config.ticker.fps, 60);
    }
}
