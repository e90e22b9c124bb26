use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::path::split_scene_file;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
pub const DEFAULT_LIGHTS_FILE: &str = "point_lights.txt";
/// Samples folded into each averaged GPU time report.
pub const DEFAULT_REPORT_INTERVAL: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Fully resolved settings for a bench run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigInfo {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub scene_path: PathBuf,
    pub scene_file: Option<String>,
    pub lights_file: PathBuf,
    pub random_lights: Option<u32>,
    pub report_interval: u64,
    pub max_frames: Option<u64>,
    pub run_for: Option<Duration>,
}

impl Default for ConfigInfo {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vsync: true,
            scene_path: PathBuf::from("."),
            scene_file: None,
            lights_file: PathBuf::from(DEFAULT_LIGHTS_FILE),
            random_lights: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
            max_frames: None,
            run_for: None,
        }
    }
}

/// Optional values from one configuration layer (file or command line).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
    pub scene_path: Option<PathBuf>,
    pub scene_file: Option<String>,
    pub lights_file: Option<PathBuf>,
    pub random_lights: Option<u32>,
    pub report_interval: Option<u64>,
    pub max_frames: Option<u64>,
    pub run_for: Option<Duration>,
}

impl ConfigOverrides {
    /// Field-wise merge where values already set on `self` win.
    pub fn or(self, fallback: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            width: self.width.or(fallback.width),
            height: self.height.or(fallback.height),
            vsync: self.vsync.or(fallback.vsync),
            scene_path: self.scene_path.or(fallback.scene_path),
            scene_file: self.scene_file.or(fallback.scene_file),
            lights_file: self.lights_file.or(fallback.lights_file),
            random_lights: self.random_lights.or(fallback.random_lights),
            report_interval: self.report_interval.or(fallback.report_interval),
            max_frames: self.max_frames.or(fallback.max_frames),
            run_for: self.run_for.or(fallback.run_for),
        }
    }
}

impl ConfigInfo {
    /// Layers defaults, then `file`, then `overrides`, and validates the result.
    pub fn resolve(
        file: Option<&ConfigFile>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let file_layer = file.map(ConfigFile::overrides).unwrap_or_default();
        Self::from_overrides(overrides.clone().or(file_layer))
    }

    pub fn from_overrides(layer: ConfigOverrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // A scene given with a directory but no explicit scene path takes its
        // directory as the scene path.
        let (scene_path, scene_file) = match (layer.scene_path, layer.scene_file) {
            (Some(path), file) => (path, file),
            (None, Some(file)) => {
                let (directory, name) = split_scene_file(&file);
                match directory {
                    Some(directory) => (PathBuf::from(directory), Some(name.to_string())),
                    None => (defaults.scene_path.clone(), Some(file.clone())),
                }
            }
            (None, None) => (defaults.scene_path.clone(), None),
        };

        let config = Self {
            width: layer.width.unwrap_or(defaults.width),
            height: layer.height.unwrap_or(defaults.height),
            vsync: layer.vsync.unwrap_or(defaults.vsync),
            scene_path,
            scene_file: scene_file.filter(|file| !file.is_empty()),
            lights_file: layer.lights_file.unwrap_or(defaults.lights_file),
            random_lights: layer.random_lights,
            report_interval: layer.report_interval.unwrap_or(defaults.report_interval),
            max_frames: layer.max_frames,
            run_for: layer.run_for,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.report_interval == 0 {
            return Err(ConfigError::Invalid(
                "report_interval must be greater than zero".into(),
            ));
        }
        if self.max_frames == Some(0) {
            return Err(ConfigError::Invalid(
                "max_frames must be greater than zero".into(),
            ));
        }
        if self.run_for.is_some_and(|duration| duration.is_zero()) {
            return Err(ConfigError::Invalid(
                "run_for must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Light file location; relative paths resolve against the scene path.
    pub fn lights_path(&self) -> PathBuf {
        if self.lights_file.is_absolute() {
            self.lights_file.clone()
        } else {
            self.scene_path.join(&self.lights_file)
        }
    }

    pub fn scene_file_path(&self) -> Option<PathBuf> {
        self.scene_file
            .as_ref()
            .map(|file| self.scene_path.join(file))
    }
}

/// On-disk TOML representation.
///
/// ```toml
/// [window]
/// width = 1280
/// height = 720
/// vsync = false
///
/// [scene]
/// path = "scenes/cornell"
/// file = "cornell.gltf"
/// lights = "point_lights.txt"
///
/// [profiler]
/// report_interval = 600
/// run_for = "30s"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub scene: SceneSection,
    #[serde(default)]
    pub profiler: ProfilerSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WindowSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vsync: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lights: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_lights: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub run_for: Option<Duration>,
}

impl ConfigFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            width: self.window.width,
            height: self.window.height,
            vsync: self.window.vsync,
            scene_path: self.scene.path.clone(),
            scene_file: self.scene.file.clone(),
            lights_file: self.scene.lights.clone(),
            random_lights: self.scene.random_lights,
            report_interval: self.profiler.report_interval,
            max_frames: self.profiler.max_frames,
            run_for: self.profiler.run_for,
        }
    }
}

impl From<&ConfigInfo> for ConfigFile {
    fn from(config: &ConfigInfo) -> Self {
        Self {
            window: WindowSection {
                width: Some(config.width),
                height: Some(config.height),
                vsync: Some(config.vsync),
            },
            scene: SceneSection {
                path: Some(config.scene_path.clone()),
                file: config.scene_file.clone(),
                lights: Some(config.lights_file.clone()),
                random_lights: config.random_lights,
            },
            profiler: ProfilerSection {
                report_interval: Some(config.report_interval),
                max_frames: config.max_frames,
                run_for: config.run_for,
            },
        }
    }
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => {
            serializer.serialize_str(&humantime::format_duration(*duration).to_string())
        }
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be a finite non-negative number"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }
    }

    deserializer.deserialize_any(Visitor)
}
