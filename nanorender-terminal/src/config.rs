/// Viewer configuration loaded from an optional TOML file
use std::fs;
use std::path::{Path, PathBuf};

use nanorender_core::assets::DEFAULT_MAX_DEPTH;
use nanorender_core::{CameraSettings, OrbitState, RenderOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How frames are drawn into the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentStyle {
    /// Two pixels per cell with 24-bit color half blocks
    #[default]
    Color,
    /// One glyph per cell from a luminance ramp
    Ascii,
}

/// Every setting of the viewer and the headless renderer.
///
/// Missing keys fall back to their defaults, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Output size of exported images
    pub width: u32,
    pub height: u32,
    /// Frame rate target of the interactive loop
    pub fps: u32,
    /// Pixels of orbit drag per terminal cell of mouse movement
    pub drag_scale: f32,
    pub style: PresentStyle,
    /// Mesh opened first
    pub mesh: Option<PathBuf>,
    /// Further meshes selectable with the number keys
    pub models: Vec<PathBuf>,
    /// Recentre and rescale meshes into the unit cube after loading
    pub normalize: bool,
    /// Image written when the viewer quits
    pub output: Option<PathBuf>,
    /// Parent directories searched for an `assets` folder
    pub asset_depth: usize,
    pub camera: CameraSettings,
    pub render: RenderOptions,
    pub orbit: OrbitState,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            fps: 30,
            drag_scale: 8.0,
            style: PresentStyle::Color,
            mesh: None,
            models: Vec::new(),
            normalize: true,
            output: None,
            asset_depth: DEFAULT_MAX_DEPTH,
            camera: CameraSettings::default(),
            render: RenderOptions::default(),
            orbit: OrbitState::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Camera settings for exported images
    pub fn export_settings(&self) -> CameraSettings {
        CameraSettings {
            width: self.width,
            height: self.height,
            ..self.camera
        }
    }

    /// `mesh` followed by `models`, without duplicates
    pub fn model_list(&self) -> Vec<PathBuf> {
        let mut list: Vec<PathBuf> = Vec::new();
        for path in self.mesh.iter().chain(&self.models) {
            if !list.contains(path) {
                list.push(path.clone());
            }
        }
        list
    }
}
