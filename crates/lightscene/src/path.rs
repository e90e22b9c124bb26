/// Returned when a path carries no directory component.
pub const CURRENT_DIRECTORY: &str = "./";

/// Directory prefix of `file_path`, including the trailing separator.
///
/// Both `/` and `\` count as separators so scene paths written on either
/// platform resolve the same way.
pub fn extract_directory(file_path: &str) -> &str {
    match file_path.rfind(['/', '\\']) {
        Some(index) => &file_path[..=index],
        None => CURRENT_DIRECTORY,
    }
}

/// Splits a scene reference into its directory (if any) and file name.
pub fn split_scene_file(file_path: &str) -> (Option<&str>, &str) {
    match file_path.rfind(['/', '\\']) {
        Some(index) => (Some(&file_path[..=index]), &file_path[index + 1..]),
        None => (None, file_path),
    }
}
