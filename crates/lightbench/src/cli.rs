use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lightscene::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "lightbench",
    author,
    version,
    about = "Point-light renderer that times its lighting pass on the GPU",
    arg_required_else_help = false
)]
pub struct Cli {
    /// TOML config file; defaults to `lightbench.toml` in the user config directory.
    #[arg(long, value_name = "PATH", env = "LIGHTBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window width in physical pixels.
    #[arg(long, value_name = "PIXELS", env = "LIGHTBENCH_WIDTH")]
    pub width: Option<u32>,

    /// Window height in physical pixels.
    #[arg(long, value_name = "PIXELS", env = "LIGHTBENCH_HEIGHT")]
    pub height: Option<u32>,

    /// Present with vsync: `1`/`on`/`true` or `0`/`off`/`false`.
    #[arg(long, value_name = "0|1", env = "LIGHTBENCH_VSYNC", value_parser = parse_vsync)]
    pub vsync: Option<bool>,

    /// Directory holding the scene and its light file.
    #[arg(long, value_name = "DIR", env = "LIGHTBENCH_SCENE_PATH")]
    pub scene_path: Option<PathBuf>,

    /// Scene file; its directory becomes the scene path when `--scene-path` is absent.
    #[arg(long, value_name = "FILE", env = "LIGHTBENCH_SCENE")]
    pub scene: Option<String>,

    /// Point-light file, relative to the scene path unless absolute.
    #[arg(long, value_name = "FILE", env = "LIGHTBENCH_LIGHTS")]
    pub lights: Option<PathBuf>,

    /// Scatter this many random lights instead of reading the light file.
    #[arg(long, value_name = "COUNT", env = "LIGHTBENCH_RANDOM_LIGHTS")]
    pub random_lights: Option<u32>,

    /// Seed for `--random-lights`, for reproducible runs.
    #[arg(long, value_name = "SEED", env = "LIGHTBENCH_SEED")]
    pub seed: Option<u64>,

    /// GPU timing samples folded into each averaged report.
    #[arg(long, value_name = "SAMPLES", env = "LIGHTBENCH_REPORT_EVERY")]
    pub report_every: Option<u64>,

    /// Exit after rendering this many frames.
    #[arg(long, value_name = "COUNT", env = "LIGHTBENCH_FRAMES")]
    pub frames: Option<u64>,

    /// Exit after this much wall-clock time (e.g. `30s`, `2m`).
    #[arg(long, value_name = "DURATION", env = "LIGHTBENCH_RUN_FOR", value_parser = parse_duration)]
    pub run_for: Option<Duration>,

    /// Print the resolved configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            width: self.width,
            height: self.height,
            vsync: self.vsync,
            scene_path: self.scene_path.clone(),
            scene_file: self.scene.clone(),
            lights_file: self.lights.clone(),
            random_lights: self.random_lights,
            report_interval: self.report_every,
            max_frames: self.frames,
            run_for: self.run_for,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Accepts integers (positive means on) as well as the usual on/off words.
pub fn parse_vsync(value: &str) -> Result<bool, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("vsync value must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => normalized
            .parse::<i64>()
            .map(|value| value > 0)
            .map_err(|_| format!("invalid vsync value '{trimmed}'; use 0/1 or on/off")),
    }
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{trimmed}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_accepts_numbers_and_words() {
        assert_eq!(parse_vsync("1"), Ok(true));
        assert_eq!(parse_vsync("2"), Ok(true));
        assert_eq!(parse_vsync("0"), Ok(false));
        assert_eq!(parse_vsync("-1"), Ok(false));
        assert_eq!(parse_vsync(" On "), Ok(true));
        assert_eq!(parse_vsync("false"), Ok(false));
        assert!(parse_vsync("sometimes").is_err());
        assert!(parse_vsync("").is_err());
    }

    #[test]
    fn durations_accept_seconds_and_humantime() {
        assert_eq!(parse_duration("15"), Ok(Duration::from_secs(15)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1s 500ms"), Ok(Duration::from_millis(1500)));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn flags_map_onto_config_overrides() {
        let cli = Cli::try_parse_from([
            "lightbench",
            "--width",
            "1280",
            "--height",
            "720",
            "--vsync",
            "0",
            "--scene",
            "scenes/cornell.gltf",
            "--report-every",
            "500",
            "--run-for",
            "10s",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.width, Some(1280));
        assert_eq!(overrides.height, Some(720));
        assert_eq!(overrides.vsync, Some(false));
        assert_eq!(overrides.scene_file.as_deref(), Some("scenes/cornell.gltf"));
        assert_eq!(overrides.report_interval, Some(500));
        assert_eq!(overrides.run_for, Some(Duration::from_secs(10)));
        assert_eq!(overrides.scene_path, None);
        assert!(!cli.print_config);
    }

    #[test]
    fn rejects_non_numeric_width() {
        assert!(Cli::try_parse_from(["lightbench", "--width", "wide"]).is_err());
    }
}
