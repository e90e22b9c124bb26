//! Point-light text files.
//!
//! Each light takes two lines: a position `x, y, z` followed by a colour
//! `r, g, b`. Blank lines between entries are ignored.
//!
//! ```text
//! 0.0, 2.5, -1.0
//! 1.0, 0.8, 0.6
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use tracing::debug;

/// Light kind tag stored alongside each light for the shader.
pub const POINT_LIGHT: u32 = 1;

/// GPU layout of a point light; matches the WGSL struct used by the bench.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    pub position: [f32; 3],
    pub kind: u32,
    pub color: [f32; 3],
    pub _padding: f32,
}

impl PointLight {
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position,
            kind: POINT_LIGHT,
            color,
            _padding: 0.0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LightsError {
    #[error("failed to read point lights from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: expected light position `x, y, z`, found '{text}'")]
    Position { line: usize, text: String },
    #[error("line {line}: expected light colour `r, g, b`, found '{text}'")]
    Color { line: usize, text: String },
    #[error("line {line}: light position has no colour line after it")]
    MissingColor { line: usize },
}

pub fn load_point_lights(path: &Path) -> Result<Vec<PointLight>, LightsError> {
    let source = fs::read_to_string(path).map_err(|source| LightsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let lights = parse_point_lights(&source)?;
    debug!(path = %path.display(), count = lights.len(), "loaded point lights");
    Ok(lights)
}

pub fn parse_point_lights(source: &str) -> Result<Vec<PointLight>, LightsError> {
    let mut lights = Vec::with_capacity(source.lines().count() / 2);
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(index, text)| (index + 1, text.trim()))
        .filter(|(_, text)| !text.is_empty());

    while let Some((line, text)) = lines.next() {
        let position = parse_triplet(text).ok_or_else(|| LightsError::Position {
            line,
            text: text.to_string(),
        })?;
        let (color_line, color_text) = lines.next().ok_or(LightsError::MissingColor { line })?;
        let color = parse_triplet(color_text).ok_or_else(|| LightsError::Color {
            line: color_line,
            text: color_text.to_string(),
        })?;
        lights.push(PointLight::new(position, color));
    }

    Ok(lights)
}

fn parse_triplet(text: &str) -> Option<[f32; 3]> {
    let mut parts = text.split(',').map(str::trim);
    let mut next = || parts.next()?.parse::<f32>().ok();
    let triplet = [next()?, next()?, next()?];
    if parts.next().is_some() {
        return None;
    }
    Some(triplet)
}
