//! Page configuration (page.toml)
//!
//! Loaded once when the page plugin is built. A missing file means defaults;
//! a broken file is logged and also falls back to defaults.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::PageError;

pub const CONFIG_FILE_NAME: &str = "page.toml";

#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub fireworks: FireworksConfig,
    #[serde(default)]
    pub starfield: StarfieldConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Local date-time, `YYYY-MM-DDTHH:MM:SS`
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Replaces the heading once the countdown expires
    #[serde(default = "default_completed_message")]
    pub completed_message: String,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            heading: default_heading(),
            completed_message: default_completed_message(),
        }
    }
}

fn default_target() -> String {
    "2025-08-29T00:00:00".to_string()
}

fn default_heading() -> String {
    "Counting down to Qixi".to_string()
}

fn default_completed_message() -> String {
    "Happy Qixi!".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FireworksConfig {
    /// How long a show keeps emitting bursts
    #[serde(default = "default_show_secs")]
    pub show_secs: f32,
    /// Hard deadline after a show stops before the surface is cleared and hidden
    #[serde(default = "default_cleanup_secs")]
    pub cleanup_secs: f32,
    #[serde(default = "default_burst_interval_secs")]
    pub burst_interval_secs: f32,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            show_secs: default_show_secs(),
            cleanup_secs: default_cleanup_secs(),
            burst_interval_secs: default_burst_interval_secs(),
        }
    }
}

fn default_show_secs() -> f32 {
    DEFAULT_SHOW_SECS
}

fn default_cleanup_secs() -> f32 {
    DEFAULT_CLEANUP_SECS
}

fn default_burst_interval_secs() -> f32 {
    DEFAULT_BURST_INTERVAL_SECS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StarfieldConfig {
    #[serde(default = "default_star_count")]
    pub star_count: usize,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: default_star_count(),
        }
    }
}

fn default_star_count() -> usize {
    DEFAULT_STAR_COUNT
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Distance from the end of the content that counts as "bottom"
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: f32,
    /// Cooldown before the bottom detector can fire again
    #[serde(default = "default_rearm_secs")]
    pub rearm_secs: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            bottom_margin: default_bottom_margin(),
            rearm_secs: default_rearm_secs(),
        }
    }
}

fn default_bottom_margin() -> f32 {
    DEFAULT_SCROLL_BOTTOM_MARGIN
}

fn default_rearm_secs() -> f32 {
    DEFAULT_SCROLL_REARM_SECS
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Path relative to the Bevy asset folder
    #[serde(default = "default_music")]
    pub music: String,
    /// Plain filesystem path, read once at startup
    #[serde(default = "default_timeline")]
    pub timeline: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            music: default_music(),
            timeline: default_timeline(),
        }
    }
}

fn default_music() -> String {
    "audio/bgm.wav".to_string()
}

fn default_timeline() -> PathBuf {
    PathBuf::from("assets/data/timeline.json")
}

// ============================================================================
// LOADING
// ============================================================================

impl PageConfig {
    /// Load page.toml from the working directory, falling back to defaults
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE_NAME);
        if !path.exists() {
            info!("No {} found, using default page config", CONFIG_FILE_NAME);
            return Self::default();
        }

        match Self::load_from_path(path) {
            Ok(config) => {
                info!("Loaded page config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("{} - using default page config", e);
                Self::default()
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, PageError> {
        let content = std::fs::read_to_string(path).map_err(|e| PageError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, PageError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every duration becomes a `Timer`, so it must be finite and positive
    pub fn validate(&self) -> Result<(), PageError> {
        check_duration("fireworks.show_secs", self.fireworks.show_secs)?;
        check_duration("fireworks.cleanup_secs", self.fireworks.cleanup_secs)?;
        check_duration("fireworks.burst_interval_secs", self.fireworks.burst_interval_secs)?;
        check_duration("scroll.rearm_secs", self.scroll.rearm_secs)?;

        let margin = self.scroll.bottom_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(PageError::ConfigValue {
                field: "scroll.bottom_margin",
                value: margin,
                reason: "must be a finite, non-negative distance",
            });
        }
        Ok(())
    }
}

fn check_duration(field: &'static str, secs: f32) -> Result<(), PageError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(())
    } else {
        Err(PageError::ConfigValue {
            field,
            value: secs,
            reason: "must be a finite number of seconds greater than zero",
        })
    }
}
