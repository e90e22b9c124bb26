//! Scene-side glue for lightbench: what to render and how big.
//!
//! - `config` layers built-in defaults, an optional TOML file, and command
//!   line overrides into a single `ConfigInfo`.
//! - `lights` parses the point-light text format into GPU-ready records.
//! - `path`, `dpi`, and `random` hold the small helpers the bench leans on
//!   (directory extraction, DPI scaling, random light placement).

pub mod config;
pub mod dpi;
pub mod lights;
pub mod path;
pub mod random;

pub use config::{ConfigError, ConfigFile, ConfigInfo, ConfigOverrides};
pub use dpi::{dpi_scale, effective_dpi};
pub use lights::{load_point_lights, parse_point_lights, LightsError, PointLight};
pub use path::{extract_directory, split_scene_file};
pub use random::{random_float, random_lights};
