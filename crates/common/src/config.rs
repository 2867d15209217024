//! YAML configuration for the maze scene.
//!
//! Every field is optional in the file; missing fields take the defaults
//! below.
//!
//! ```yaml
//! cell_width: 0.5
//! strategy: auto
//! camera:
//!   eye: [0.0, 6.0, 12.0]
//!   fovy_degrees: 45.0
//! grid:
//!   - "#####"
//!   - "#...#"
//!   - "#####"
//! ```

use crate::grid::{GridError, GridMap};
use crate::types::look_at_is_degenerate;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid grid: {0}")]
    Grid(#[from] GridError),
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Which block drawing strategy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyPreference {
    /// Hardware instancing when the backend supports it.
    #[default]
    Auto,
    Instanced,
    PerInstance,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy {0:?} (expected auto, instanced or per-instance)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyPreference {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "instanced" => Ok(Self::Instanced),
            "per-instance" => Ok(Self::PerInstance),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for StrategyPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Instanced => "instanced",
            Self::PerInstance => "per-instance",
        };
        f.write_str(name)
    }
}

/// Initial camera placement and lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub at: Vec3,
    pub up: Vec3,
    pub fovy_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 6.0, 12.0),
            at: Vec3::ZERO,
            up: Vec3::Y,
            fovy_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Increments applied per key press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub move_step: f32,
    pub eye_step: f32,
    pub rotate_step_degrees: f32,
    pub scale_step: f32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            move_step: 0.25,
            eye_step: 0.5,
            rotate_step_degrees: 5.0,
            scale_step: 1.1,
        }
    }
}

/// Top-level maze configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Half extent of one wall block. Neighbouring blocks sit `2 * cell_width` apart.
    pub cell_width: f32,
    pub strategy: StrategyPreference,
    pub camera: CameraConfig,
    pub clear_color: [f32; 4],
    pub steps: StepConfig,
    /// Maze rows; the compiled-in reference maze when absent.
    pub grid: Option<Vec<String>>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            cell_width: 0.5,
            strategy: StrategyPreference::Auto,
            camera: CameraConfig::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            steps: StepConfig::default(),
            grid: None,
        }
    }
}

impl MazeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The occupancy grid this config describes.
    pub fn grid_map(&self) -> Result<GridMap, GridError> {
        match &self.grid {
            Some(rows) => GridMap::from_rows(rows),
            None => Ok(GridMap::reference()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_width.is_nan() || self.cell_width <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cell_width",
                reason: format!("must be positive, got {}", self.cell_width),
            });
        }
        let cam = &self.camera;
        let clip_ok = cam.near > 0.0 && cam.near < cam.far;
        if !clip_ok {
            return Err(ConfigError::Invalid {
                field: "camera.near",
                reason: format!("need 0 < near < far, got near={} far={}", cam.near, cam.far),
            });
        }
        let fovy_ok = cam.fovy_degrees > 0.0 && cam.fovy_degrees < 180.0;
        if !fovy_ok {
            return Err(ConfigError::Invalid {
                field: "camera.fovy_degrees",
                reason: format!("must be in (0, 180), got {}", cam.fovy_degrees),
            });
        }
        if look_at_is_degenerate(cam.eye, cam.at, cam.up) {
            return Err(ConfigError::Invalid {
                field: "camera",
                reason: "eye must differ from at and eye - at must not be parallel to up".into(),
            });
        }
        self.grid_map()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = MazeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.grid_map().unwrap(), GridMap::reference());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = MazeConfig::from_yaml("{}").unwrap();
        assert_eq!(config, MazeConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = MazeConfig::from_yaml(
            "cell_width: 1.0\nstrategy: per-instance\ncamera:\n  eye: [1.0, 2.0, 3.0]\n",
        )
        .unwrap();
        assert_eq!(config.cell_width, 1.0);
        assert_eq!(config.strategy, StrategyPreference::PerInstance);
        assert_eq!(config.camera.eye, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.at, Vec3::ZERO);
    }

    #[test]
    fn custom_grid_is_parsed() {
        let config = MazeConfig::from_yaml("grid:\n  - \"##\"\n  - \".#\"\n").unwrap();
        assert_eq!(config.grid_map().unwrap().occupied_count(), 3);
    }

    #[test]
    fn bad_grid_rejected() {
        let err = MazeConfig::from_yaml("grid:\n  - \"##\"\n  - \"#\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Grid(GridError::RaggedRow { .. })));
    }

    #[test]
    fn non_positive_cell_width_rejected() {
        let err = MazeConfig::from_yaml("cell_width: 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cell_width", .. }));
    }

    #[test]
    fn inverted_clip_planes_rejected() {
        let err = MazeConfig::from_yaml("camera:\n  near: 10.0\n  far: 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera.near", .. }));
    }

    #[test]
    fn eye_above_target_rejected() {
        let err = MazeConfig::from_yaml("camera:\n  eye: [0.0, 6.0, 0.0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera", .. }));
        let err = MazeConfig::from_yaml("camera:\n  eye: [0.0, 0.0, 0.0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "camera", .. }));
    }

    #[test]
    fn strategy_from_str() {
        assert_eq!("auto".parse::<StrategyPreference>().unwrap(), StrategyPreference::Auto);
        assert_eq!(
            "per-instance".parse::<StrategyPreference>().unwrap(),
            StrategyPreference::PerInstance
        );
        assert!("fast".parse::<StrategyPreference>().is_err());
        assert_eq!(StrategyPreference::Instanced.to_string(), "instanced");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cell_width: 2.0").unwrap();
        let config = MazeConfig::load(file.path()).unwrap();
        assert_eq!(config.cell_width, 2.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MazeConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn yaml_round_trip() {
        let config = MazeConfig {
            grid: Some(vec!["#.#".into()]),
            ..MazeConfig::default()
        };
        let text = config.to_yaml().unwrap();
        assert_eq!(MazeConfig::from_yaml(&text).unwrap(), config);
    }
}
