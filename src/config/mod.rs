use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::{CanvasSize, Color};
use crate::session::SessionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "memepress";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AppConfig {
    #[serde(default = "default_max_canvas_width")]
    pub(crate) max_canvas_width: u32,
    #[serde(default = "default_max_canvas_height")]
    pub(crate) max_canvas_height: u32,
    /// Canvas background as hex notation, e.g. `"#ffffff"`.
    #[serde(default)]
    pub(crate) background: Option<String>,
    /// Directory holding `overlays.json` and the sticker images it lists.
    #[serde(default)]
    pub(crate) overlay_pack_dir: Option<PathBuf>,
    #[serde(default = "default_overlay_offset")]
    pub(crate) overlay_offset_x: f64,
    #[serde(default = "default_overlay_offset")]
    pub(crate) overlay_offset_y: f64,
}

const fn default_max_canvas_width() -> u32 {
    1280
}

const fn default_max_canvas_height() -> u32 {
    720
}

const fn default_overlay_offset() -> f64 {
    100.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_canvas_width: default_max_canvas_width(),
            max_canvas_height: default_max_canvas_height(),
            background: None,
            overlay_pack_dir: None,
            overlay_offset_x: default_overlay_offset(),
            overlay_offset_y: default_overlay_offset(),
        }
    }
}

impl AppConfig {
    pub(crate) fn session_options(&self) -> SessionOptions {
        let background = self
            .background
            .as_deref()
            .and_then(|hex| {
                let parsed = Color::from_hex(hex);
                if parsed.is_none() {
                    tracing::warn!(hex, "unparseable background color; using white");
                }
                parsed
            })
            .unwrap_or(Color::WHITE);

        SessionOptions {
            max_canvas: CanvasSize::new(self.max_canvas_width.max(1), self.max_canvas_height.max(1)),
            background,
            overlay_offset: (self.overlay_offset_x, self.overlay_offset_y),
        }
    }
}

pub(crate) fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
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
