//! System emoji font discovery
//!
//! Used when the user asks to open a font without naming one.

use std::path::{Path, PathBuf};

use log::{info, trace, warn};

use crate::constants::SYSTEM_EMOJI_FONT_PATHS;
use crate::utils::expand_path;

/// Resolve the font to open: the configured path if it exists, else the
/// first well-known system emoji font found on disk.
pub fn find_emoji_font(configured: &str) -> Option<PathBuf> {
    if !configured.is_empty() {
        let path = PathBuf::from(expand_path(configured, None));
        if path.exists() {
            info!("Using configured font: {}", path.display());
            return Some(path);
        }
        warn!("Configured font not found: {}", path.display());
    }

    first_existing(SYSTEM_EMOJI_FONT_PATHS.iter().map(Path::new))
}

fn first_existing<'a>(candidates: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    for path in candidates {
        if path.exists() {
            info!("Found system emoji font: {}", path.display());
            return Some(path.to_path_buf());
        }
        trace!("Emoji font not found: {}", path.display());
    }
    None
}
