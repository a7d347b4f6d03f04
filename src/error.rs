//! Error taxonomy
//!
//! Every failure a user action can hit. The controller catches these at the
//! boundary of the action and turns them into notices.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::export::ExportFormat;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Font file could not be read
    #[error("Error loading or reading font file '{}': {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Font data is truncated, corrupt or not an sfnt font
    #[error("Error loading or reading font file: {0}")]
    FontParse(String),

    #[error("No suitable Unicode cmap table found in the font for emojis.")]
    NoUnicodeCmap,

    #[error("Unicode codepoint {0:04X} not found in font cmap.")]
    CodepointNotFound(u32),

    #[error("Glyph '{0}' not found in font.")]
    GlyphNotFound(String),

    #[error("Glyph '{0}' has zero dimensions.")]
    DegenerateGlyph(String),

    /// Rendering path that is not implemented for this glyph
    #[error("Cannot render U+{codepoint:04X}: {reason}")]
    CapabilityLimitation { codepoint: u32, reason: String },

    #[error("Error saving image as {format}: {source}")]
    ImageEncode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("Error saving image to '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Missing font, missing selection or out-of-range input
    #[error("{0}")]
    Validation(String),
}

impl ExtractError {
    /// Errors after which the loaded emoji list must be cleared
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::FileOpen { .. } | Self::FontParse(_) | Self::NoUnicodeCmap
        )
    }

    /// Title of the notice shown for this error
    pub fn notice_title(&self) -> &'static str {
        match self {
            Self::CapabilityLimitation { .. } => "Limitation",
            _ => "Error",
        }
    }

    pub(crate) fn truncated(what: &str, offset: usize) -> Self {
        Self::FontParse(format!("{} truncated at offset {}", what, offset))
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
