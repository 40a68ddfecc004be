//! Console prefixes and path display helpers.

use owo_colors::OwoColorize;
use std::path::Path;

fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if color_enabled() {
        "⟦error⟧".red().bold().to_string()
    } else {
        "⟦error⟧".to_string()
    }
}

pub fn note_prefix() -> String {
    if color_enabled() {
        "⟦note⟧".yellow().bold().to_string()
    } else {
        "⟦note⟧".to_string()
    }
}

pub fn info_prefix() -> String {
    if color_enabled() {
        "⟦info⟧".blue().bold().to_string()
    } else {
        "⟦info⟧".to_string()
    }
}

/// `path` relative to `base` when possible, for display.
pub fn rel_display(path: &Path, base: &Path) -> String {
    pathdiff::diff_paths(path, base)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rel_display() {
        assert_eq!(
            rel_display(Path::new("/ws/demo/rules/a.toml"), Path::new("/ws/demo")),
            "rules/a.toml"
        );
        assert_eq!(
            rel_display(Path::new("/ws/demo"), Path::new("/ws/demo")),
            "/ws/demo"
        );
    }
}
