//! Font inspection
//!
//! Handles:
//! - sfnt table directory parsing (TTF/OTF, first font of a TTC)
//! - cmap subtable decoding (formats 4 and 12)
//! - Emoji codepoint catalogs
//! - Color glyph table indexing (CBDT/CBLC, COLR, sbix, SVG)
//! - Glyph names and outline bounds (rustybuzz)
//! - System emoji font discovery

pub mod cmap;
pub mod color_tables;
pub mod discovery;
pub mod glyphs;
pub mod loader;
pub mod report;
pub mod sfnt;

#[cfg(test)]
pub(crate) mod testutil;

pub use loader::{parse_label, EmojiCatalog, EmojiEntry};
pub use report::FontReport;
