//! Global constants for emoji-extract
//!
//! Consolidates export defaults, Unicode range constants and well-known
//! font locations to eliminate magic numbers throughout the codebase.

use std::ops::RangeInclusive;

// ============================================================================
// Export Constants
// ============================================================================

/// Export size used when the size field is empty, non-numeric or zero (pixels)
pub const DEFAULT_EXPORT_SIZE: u32 = 128;

/// Upper bound accepted for the export size unless configured otherwise
pub const DEFAULT_MAX_EXPORT_SIZE: u32 = 4096;

/// Default JPEG quality (1-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

// ============================================================================
// Labels
// ============================================================================

/// Prefix of codepoint display labels ("U+1F600")
pub const LABEL_PREFIX: &str = "U+";

// ============================================================================
// Unicode Ranges for Emoji Listing
// ============================================================================

/// Codepoint ranges conventionally associated with emoji.
///
/// The first range covers all of the others; they are kept as listed so the
/// filter stays recognisable next to the block names:
/// - U+1F000-U+1FFFF: Supplementary Multilingual Plane symbol blocks
/// - U+1F300-U+1F6FF: Misc Symbols and Pictographs, Emoticons, Transport
/// - U+1F680-U+1F6FF: Transport and Map Symbols
/// - U+1F900-U+1F9FF: Supplemental Symbols and Pictographs
/// - U+1FA00-U+1FAFF: Chess Symbols, Symbols and Pictographs Extended-A
pub const EMOJI_RANGES: [RangeInclusive<u32>; 5] = [
    0x1F000..=0x1FFFF,
    0x1F300..=0x1F6FF,
    0x1F680..=0x1F6FF,
    0x1F900..=0x1F9FF,
    0x1FA00..=0x1FAFF,
];

/// Check if a code point falls inside one of the emoji ranges
#[inline]
pub fn is_emoji_codepoint(cp: u32) -> bool {
    EMOJI_RANGES.iter().any(|range| range.contains(&cp))
}

// ============================================================================
// Font Locations
// ============================================================================

/// Candidate paths for a system emoji font, tried in order
pub const SYSTEM_EMOJI_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
    "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
    "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
    "/usr/share/fonts/TTF/NotoColorEmoji.ttf",
    "/usr/share/fonts/truetype/ancient-scripts/Symbola_hint.ttf",
    "/System/Library/Fonts/Apple Color Emoji.ttc",
    "C:\\Windows\\Fonts\\seguiemj.ttf",
];
