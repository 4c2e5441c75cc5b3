//! Game tuning loaded from an optional RON file.
//!
//! Looks for `$TILTBALL_CONFIG`, then `tiltball.ron` in the working directory. A missing file
//! means defaults; a malformed one is reported and also falls back to defaults so a typo never
//! keeps the game from starting.

use std::{fs, io, path::PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tiltball_shared::{
    DEFAULT_FIXED_DT, PlatformDef, PlayerSpawnDef, RollingConfig, StaticDef, TiltConfig,
};
use tracing::{info, warn};

const CONFIG_ENV: &str = "TILTBALL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "tiltball.ron";

#[derive(Resource, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub fixed_hz: f64,
    pub rolling: RollingConfig,
    #[serde(deserialize_with = "camera_tilt")]
    pub tilt: TiltConfig,
    pub player: PlayerSpawnDef,
    pub platform: PlatformDef,
    /// Fixed level geometry (walls, triggers) beyond the tilting platform.
    pub statics: Vec<StaticDef>,
    /// Falling below this height restarts the level.
    pub kill_plane_y: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_hz: f64::from(1.0 / DEFAULT_FIXED_DT),
            rolling: RollingConfig::default(),
            tilt: CameraTilt::default().into(),
            player: PlayerSpawnDef::default(),
            platform: PlatformDef::default(),
            statics: Vec::new(),
            kill_plane_y: -20.0,
        }
    }
}

/// `TiltConfig` as read from a config file. Fields left out fall back to the camera defaults
/// rather than the library ones.
#[derive(Deserialize)]
#[serde(default)]
struct CameraTilt {
    max_tilt_angle: f32,
    tilt_speed: f32,
    smooth_speed: f32,
    invert_horizontal: bool,
    invert_vertical: bool,
}

impl Default for CameraTilt {
    fn default() -> Self {
        let base = TiltConfig::default();
        Self {
            max_tilt_angle: base.max_tilt_angle,
            tilt_speed: base.tilt_speed,
            smooth_speed: base.smooth_speed,
            // The camera looks down +Z, which puts world +X on the left of the screen.
            invert_horizontal: true,
            invert_vertical: base.invert_vertical,
        }
    }
}

impl From<CameraTilt> for TiltConfig {
    fn from(tilt: CameraTilt) -> Self {
        Self {
            max_tilt_angle: tilt.max_tilt_angle,
            tilt_speed: tilt.tilt_speed,
            smooth_speed: tilt.smooth_speed,
            invert_horizontal: tilt.invert_horizontal,
            invert_vertical: tilt.invert_vertical,
        }
    }
}

fn camera_tilt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TiltConfig, D::Error> {
    CameraTilt::deserialize(deserializer).map(Into::into)
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("reading {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

impl GameConfig {
    /// A non-positive or non-finite step rate falls back to the default.
    pub fn validated(self) -> Self {
        let default_hz = Self::default().fixed_hz;
        if self.fixed_hz.is_finite() && self.fixed_hz > 0.0 {
            return self;
        }
        warn!("fixed_hz {} is invalid; using {default_hz}", self.fixed_hz);
        Self {
            fixed_hz: default_hz,
            ..self
        }
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// `Ok(None)` when there is no file at `path`.
    pub fn load(path: PathBuf) -> Result<Option<Self>, ConfigLoadError> {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(ConfigLoadError::Io { path, source }),
        };
        Self::from_ron(&text)
            .map(Some)
            .map_err(|source| ConfigLoadError::Parse { path, source })
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub(super) fn plugin(app: &mut App) {
    let path = config_path();
    let config = match GameConfig::load(path.clone()) {
        Ok(Some(config)) => {
            info!("loaded game config from {}", path.display());
            config
        }
        Ok(None) => {
            info!("no config at {}; using defaults", path.display());
            GameConfig::default()
        }
        Err(err) => {
            warn!("{err}; using defaults");
            GameConfig::default()
        }
    }
    .validated();

    app.insert_resource(Time::<Fixed>::from_hz(config.fixed_hz));
    app.insert_resource(config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_ron_fills_in_defaults() {
        let config = GameConfig::from_ron(
            "(tilt: (max_tilt_angle: 20.0, invert_vertical: true), kill_plane_y: -5.0)",
        )
        .expect("valid ron");

        assert_eq!(config.tilt.max_tilt_angle, 20.0);
        assert!(config.tilt.invert_vertical);
        assert_eq!(config.tilt.tilt_speed, TiltConfig::default().tilt_speed);
        assert!(config.tilt.invert_horizontal);
        assert_eq!(config.kill_plane_y, -5.0);
        assert_eq!(config.rolling, RollingConfig::default());
    }

    #[test]
    fn explicit_horizontal_setting_wins() {
        let config = GameConfig::from_ron("(tilt: (invert_horizontal: false))").expect("valid ron");
        assert!(!config.tilt.invert_horizontal);
        assert_eq!(config.tilt.max_tilt_angle, TiltConfig::default().max_tilt_angle);
    }

    #[test]
    fn omitted_tilt_matches_default_config() {
        let config = GameConfig::from_ron("()").expect("valid ron");
        assert_eq!(config.tilt, GameConfig::default().tilt);
        assert!(config.tilt.invert_horizontal);
    }

    #[test]
    fn unusable_fixed_rate_falls_back_to_default() {
        let default_hz = GameConfig::default().fixed_hz;
        for text in ["(fixed_hz: 0.0)", "(fixed_hz: -30.0)"] {
            let config = GameConfig::from_ron(text).expect("valid ron").validated();
            assert_eq!(config.fixed_hz, default_hz, "{text}");
        }
        for fixed_hz in [f64::INFINITY, f64::NAN] {
            let config = GameConfig {
                fixed_hz,
                ..GameConfig::default()
            };
            assert_eq!(config.validated().fixed_hz, default_hz);
        }

        let config = GameConfig::from_ron("(fixed_hz: 50.0)").expect("valid ron").validated();
        assert_eq!(config.fixed_hz, 50.0);
    }

    #[test]
    fn statics_parse_from_ron() {
        let config = GameConfig::from_ron(
            "(statics: [(id: 4, translation: (0.0, -1.0, 12.0), rotation: (0.0, 0.0, 0.0, 1.0), \
             shape: Cuboid(half_extents: (10.0, 1.0, 0.25)))])",
        )
        .expect("valid ron");

        assert_eq!(config.statics.len(), 1);
        assert_eq!(config.statics[0].id, 4);
        assert!(!config.statics[0].sensor);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        assert!(GameConfig::from_ron("(tilt: (max_tilt_angle: \"steep\"))").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let loaded = GameConfig::load(PathBuf::from("definitely/not/here.ron")).unwrap();
        assert!(loaded.is_none());
    }
}
