use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::canvas::{clamp_canvas_size, RetryPolicy, DEFAULT_MAX_SNAPSHOT_PIXELS};
use crate::editor::tools::{clamp_brush_size, BrushOptions, DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_SIZE};
use crate::editor::EditorOptions;
use crate::filter::contrast::clamp_contrast_boost;
use crate::filter::{FilterOptions, GrayscaleAlgorithm, DEFAULT_CONTRAST_BOOST};
use crate::geometry::Color;
use crate::history::DEFAULT_MAX_HISTORY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "memedit";
const APP_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrayscaleSetting {
    #[default]
    Linear,
    Contrast,
}

/// Editor settings from `config.json`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_history_size: usize,
    pub grayscale_algorithm: GrayscaleSetting,
    pub contrast_boost: f64,
    pub brush_size: i32,
    pub brush_color: Color,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub device_pixel_ratio: f32,
    pub max_canvas_size: u32,
    pub max_snapshot_pixels: u64,
    pub acquire_retry_count: u8,
    pub acquire_retry_delay_ms: u64,
    pub param_debounce_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY_SIZE,
            grayscale_algorithm: GrayscaleSetting::Linear,
            contrast_boost: DEFAULT_CONTRAST_BOOST,
            brush_size: i32::from(DEFAULT_BRUSH_SIZE),
            brush_color: DEFAULT_BRUSH_COLOR,
            canvas_width: 300.0,
            canvas_height: 300.0,
            device_pixel_ratio: 1.0,
            max_canvas_size: 600,
            max_snapshot_pixels: DEFAULT_MAX_SNAPSHOT_PIXELS,
            acquire_retry_count: 5,
            acquire_retry_delay_ms: 500,
            param_debounce_ms: 50,
        }
    }
}

impl EditorConfig {
    pub fn filter_options(&self) -> FilterOptions {
        let grayscale = match self.grayscale_algorithm {
            GrayscaleSetting::Linear => GrayscaleAlgorithm::Linear,
            GrayscaleSetting::Contrast => GrayscaleAlgorithm::Contrast {
                boost: clamp_contrast_boost(self.contrast_boost),
            },
        };
        FilterOptions { grayscale }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.acquire_retry_count,
            delay: Duration::from_millis(self.acquire_retry_delay_ms),
        }
    }

    pub fn param_debounce(&self) -> Duration {
        Duration::from_millis(self.param_debounce_ms)
    }

    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        clamp_canvas_size(
            self.canvas_width,
            self.canvas_height,
            self.device_pixel_ratio,
            self.max_canvas_size,
        )
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            max_history_size: self.max_history_size,
            filter: self.filter_options(),
            brush: BrushOptions {
                color: self.brush_color,
                size: clamp_brush_size(self.brush_size),
            },
            acquire_retry: self.retry_policy(),
        }
    }
}

/// Reads `$XDG_CONFIG_HOME/memedit/config.json` (or `~/.config/...`).
pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EditorConfig::default(),
    };
    if !path.exists() {
        return EditorConfig::default();
    }
    load_editor_config_from(&path)
}

pub fn load_editor_config_from(path: &Path) -> EditorConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_editor_config(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EditorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EditorConfig::default()
        }
    }
}

pub fn parse_editor_config(contents: &str) -> serde_json::Result<EditorConfig> {
    serde_json::from_str(contents)
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
