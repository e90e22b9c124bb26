use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lightscene::{load_point_lights, random_lights, ConfigFile, ConfigInfo, LightsError, PointLight};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::{paths, window};

/// Half-width of the square random lights are scattered over.
const RANDOM_LIGHT_EXTENT: f32 = 10.0;

pub fn run(args: Cli) -> Result<()> {
    initialise_tracing();

    let file = load_config_file(args.config.as_ref())?;
    let config = ConfigInfo::resolve(file.as_ref(), &args.overrides())
        .context("failed to resolve configuration")?;

    if args.print_config {
        let rendered = ConfigFile::from(&config)
            .to_toml_string()
            .context("failed to render configuration")?;
        print!("{rendered}");
        return Ok(());
    }

    if let Some(scene) = config.scene_file_path() {
        tracing::info!(
            scene = %scene.display(),
            "scene file recorded; geometry loading is not part of this benchmark"
        );
    }

    let lights = load_lights(&config, args.seed)?;
    window::run(&config, lights)
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--config` path must exist; the per-user default is optional.
fn load_config_file(explicit: Option<&PathBuf>) -> Result<Option<ConfigFile>> {
    if let Some(path) = explicit {
        let file = ConfigFile::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        return Ok(Some(file));
    }

    let path = match paths::default_config_file() {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(error = %err, "no user config directory; using defaults");
            return Ok(None);
        }
    };
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no user config file; using defaults");
        return Ok(None);
    }

    tracing::debug!(path = %path.display(), "loading user config");
    let file = ConfigFile::load(&path)
        .with_context(|| format!("failed to load config {}", path.display()))?;
    Ok(Some(file))
}

fn load_lights(config: &ConfigInfo, seed: Option<u64>) -> Result<Vec<PointLight>> {
    if let Some(count) = config.random_lights {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let lights = random_lights(&mut rng, count, RANDOM_LIGHT_EXTENT);
        tracing::info!(count = lights.len(), seed, "scattered random point lights");
        return Ok(lights);
    }

    let path = config.lights_path();
    match load_point_lights(&path) {
        Ok(lights) => {
            tracing::info!(count = lights.len(), path = %path.display(), "loaded point lights");
            Ok(lights)
        }
        Err(LightsError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "point light file not found; rendering without lights"
            );
            Ok(Vec::new())
        }
        Err(err) => Err(err).context("failed to load point lights"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &std::path::Path) -> ConfigInfo {
        ConfigInfo {
            scene_path: dir.to_path_buf(),
            ..ConfigInfo::default()
        }
    }

    #[test]
    fn missing_light_file_yields_no_lights() {
        let dir = TempDir::new().unwrap();
        let lights = load_lights(&config_in(dir.path()), None).unwrap();
        assert!(lights.is_empty());
    }

    #[test]
    fn malformed_light_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("point_lights.txt"), "1, 2\n").unwrap();
        assert!(load_lights(&config_in(dir.path()), None).is_err());
    }

    #[test]
    fn seeded_random_lights_are_reproducible() {
        let config = ConfigInfo {
            random_lights: Some(8),
            ..ConfigInfo::default()
        };
        let first = load_lights(&config, Some(7)).unwrap();
        let second = load_lights(&config, Some(7)).unwrap();
        assert_eq!(first.len(), 8);
        assert_eq!(first, second);
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config_file(Some(&missing)).is_err());
    }
}
