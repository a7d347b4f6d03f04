//! Utility functions shared across emoji-extract
//!
//! Common helpers that don't fit in specialized modules.

pub mod color;

pub use color::{blend_over, parse_hex_color};

/// Expand ~ to user's home directory.
/// Uses provided user_home if available, falls back to dirs::home_dir().
pub fn expand_path(path: &str, user_home: Option<&str>) -> String {
    if !path.starts_with('~') {
        return path.to_string();
    }

    // Get home directory: prefer provided value, fallback to dirs
    let home = user_home
        .map(|h| h.to_string())
        .or_else(|| dirs::home_dir().map(|p| p.to_string_lossy().to_string()));

    match home {
        Some(home) if path == "~" => home,
        Some(home) => format!("{}{}", home, &path[1..]),
        None => path.to_string(),
    }
}
