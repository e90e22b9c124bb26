use std::fs;

use lightscene::{load_point_lights, ConfigFile, ConfigInfo, ConfigOverrides, LightsError};
use tempfile::TempDir;

#[test]
fn loads_lights_relative_to_scene_path() {
    let root = TempDir::new().unwrap();
    let scene_dir = root.path().join("cornell");
    fs::create_dir_all(&scene_dir).unwrap();
    fs::write(
        scene_dir.join("point_lights.txt"),
        "0.0, 1.9, 0.0\n1.0, 0.9, 0.7\n\n-0.5, 0.4, 0.5\n0.2, 0.3, 1.0\n",
    )
    .unwrap();
    let config_path = root.path().join("bench.toml");
    fs::write(
        &config_path,
        format!("[scene]\npath = {:?}\n", scene_dir.display().to_string()),
    )
    .unwrap();

    let file = ConfigFile::load(&config_path).unwrap();
    let config = ConfigInfo::resolve(Some(&file), &ConfigOverrides::default()).unwrap();
    let lights = load_point_lights(&config.lights_path()).unwrap();

    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].position, [0.0, 1.9, 0.0]);
    assert_eq!(lights[1].color, [0.2, 0.3, 1.0]);
}

#[test]
fn missing_file_reports_io_error_with_path() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("absent.txt");

    let err = load_point_lights(&path).unwrap_err();
    match &err {
        LightsError::Io { path: reported, source } => {
            assert_eq!(reported, &path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("absent.txt"));
}

#[test]
fn malformed_file_surfaces_parse_error() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("point_lights.txt");
    fs::write(&path, "1, 2, 3\nred, green, blue\n").unwrap();

    let err = load_point_lights(&path).unwrap_err();
    assert!(matches!(err, LightsError::Color { line: 2, .. }));
}
