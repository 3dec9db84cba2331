//! Viewer configuration.
//!
//! Everything the stage needs to know up front lives in [`ViewerConfig`]:
//! asset paths, camera and orbit limits, light, model placement and the
//! auto-resume schedule. The defaults reproduce the stock stage, so a config
//! file only has to name what it changes.
//!
//! ```json
//! {
//!     "assets": { "directory": "my_assets", "character_dance": "salsa.glb" },
//!     "auto_resume": { "interval_secs": 10.0 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub assets: AssetConfig,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub light: LightConfig,
    pub placement: PlacementConfig,
    pub auto_resume: AutoResumeConfig,
    /// Start with the music playing instead of paused.
    pub start_playing: bool,
}

impl ViewerConfig {
    /// Reads a JSON config file. Missing sections fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Dancehall".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Asset file names, resolved relative to `directory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub directory: PathBuf,
    /// Character model; its first clip is the idle animation.
    pub character_idle: PathBuf,
    /// Model whose first clip is the dance animation. Only the clip is used.
    pub character_dance: PathBuf,
    pub environment: PathBuf,
    pub background: PathBuf,
}

impl AssetConfig {
    #[must_use]
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.directory.join(file)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("assets"),
            character_idle: PathBuf::from("idleK.glb"),
            character_dance: PathBuf::from("kermit_frog.glb"),
            environment: PathBuf::from("forestEnv.glb"),
            background: PathBuf::from("sky.jpg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Orbit target, re-applied every frame.
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 1.0, 5.0),
            target: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_pan: bool,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            enable_pan: false,
            min_distance: 5.0,
            max_distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: Vec3,
    pub intensity: f32,
    pub position: Vec3,
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 2.0,
            position: Vec3::new(5.0, 30.0, 7.5),
            ambient: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub character_scale: f32,
    pub environment_scale: f32,
    pub environment_position: Vec3,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            character_scale: 1.0,
            environment_scale: 0.01,
            environment_position: Vec3::new(0.0, -1.3, 0.0),
        }
    }
}

/// While the music is paused, every `interval_secs` a resume is scheduled
/// `delay_secs` later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoResumeConfig {
    pub enabled: bool,
    pub interval_secs: f32,
    pub delay_secs: f32,
}

impl Default for AutoResumeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5.0,
            delay_secs: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = ViewerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_fields() {
        let config =
            ViewerConfig::from_json_str(r#"{ "orbit": { "max_distance": 50.0 } }"#).unwrap();
        assert_eq!(config.orbit.max_distance, 50.0);
        assert_eq!(config.orbit.min_distance, 5.0);
        assert!(!config.orbit.enable_pan);
    }

    #[test]
    fn vectors_parse_as_arrays() {
        let config =
            ViewerConfig::from_json_str(r#"{ "camera": { "position": [1.0, 2.0, 3.0] } }"#)
                .unwrap();
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn asset_paths_resolve_against_directory() {
        let assets = AssetConfig::default();
        let path = assets.resolve(&assets.background);
        assert_eq!(path, PathBuf::from("assets").join("sky.jpg"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ViewerConfig::from_json_str("{ not json").is_err());
    }
}
