//! Application configuration management.
//!
//! This module handles the persistent configuration for halo, covering the
//! visualizer tuning (beat threshold, refractory period, bar count), the
//! ambient background, the frame rate of the terminal loop and logging.
//! Configuration is stored in the user's config directory (typically
//! ~/.config/halo/config.toml); a missing file means all defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::constants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fallback_accent")]
    pub fallback_accent: String,
    #[serde(default = "default_beat_threshold")]
    pub beat_threshold: f32,
    #[serde(default = "default_refractory_ms")]
    pub refractory_ms: f64,
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_pixel_ratio")]
    pub pixel_ratio: f64,
    #[serde(default = "default_background_circles")]
    pub background_circles: usize,
    #[serde(default = "default_pulse_count")]
    pub pulse_count: usize,
    #[serde(default = "default_show_background")]
    pub show_background: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_fallback_accent() -> String {
    constants::FALLBACK_ACCENT.to_string()
}

fn default_beat_threshold() -> f32 {
    constants::BEAT_THRESHOLD
}

fn default_refractory_ms() -> f64 {
    constants::BEAT_REFRACTORY_MS
}

fn default_bar_count() -> usize {
    constants::RADIAL_BARS
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_pixel_ratio() -> f64 {
    1.0
}

fn default_background_circles() -> usize {
    constants::BACKGROUND_CIRCLES
}

fn default_pulse_count() -> usize {
    constants::PULSE_COUNT
}

fn default_show_background() -> bool {
    true
}

fn default_log_file() -> String {
    std::env::temp_dir()
        .join("halo-player.log")
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            fallback_accent: default_fallback_accent(),
            beat_threshold: default_beat_threshold(),
            refractory_ms: default_refractory_ms(),
            bar_count: default_bar_count(),
            frame_interval_ms: default_frame_interval_ms(),
            pixel_ratio: default_pixel_ratio(),
            background_circles: default_background_circles(),
            pulse_count: default_pulse_count(),
            show_background: default_show_background(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("halo")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("halo")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(0.0..=1.0).contains(&self.beat_threshold) {
            return Err("beat_threshold must be between 0 and 1".into());
        }
        if self.refractory_ms < 0.0 {
            return Err("refractory_ms must not be negative".into());
        }
        if self.bar_count == 0 {
            return Err("bar_count must be at least 1".into());
        }
        if self.frame_interval_ms == 0 {
            return Err("frame_interval_ms must be at least 1".into());
        }
        if self.pixel_ratio <= 0.0 {
            return Err("pixel_ratio must be positive".into());
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("Unknown log level: {}", self.log_level).into());
        }
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "fallback_accent" => self.fallback_accent = value.to_string(),
            "beat_threshold" => {
                self.beat_threshold = value
                    .parse()
                    .map_err(|_| "Value must be a number between 0 and 1")?;
            }
            "refractory_ms" => {
                self.refractory_ms = value.parse().map_err(|_| "Value must be a number")?;
            }
            "bar_count" => {
                self.bar_count = value
                    .parse()
                    .map_err(|_| "Value must be a positive integer")?;
            }
            "frame_interval_ms" => {
                self.frame_interval_ms = value
                    .parse()
                    .map_err(|_| "Value must be a positive integer")?;
            }
            "pixel_ratio" => {
                self.pixel_ratio = value.parse().map_err(|_| "Value must be a number")?;
            }
            "background_circles" => {
                self.background_circles = value.parse().map_err(|_| "Value must be an integer")?;
            }
            "pulse_count" => {
                self.pulse_count = value.parse().map_err(|_| "Value must be an integer")?;
            }
            "show_background" => {
                self.show_background = value
                    .parse::<bool>()
                    .map_err(|_| "Value must be 'true' or 'false'")?;
            }
            "log_file" => self.log_file = value.to_string(),
            "log_level" => self.log_level = value.to_string(),
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        self.validate()
    }
}

/// Keys accepted by [`Config::set_value`].
pub const CONFIG_KEYS: &[&str] = &[
    "fallback_accent",
    "beat_threshold",
    "refractory_ms",
    "bar_count",
    "frame_interval_ms",
    "pixel_ratio",
    "background_circles",
    "pulse_count",
    "show_background",
    "log_file",
    "log_level",
];
