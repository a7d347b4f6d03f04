//! Emoji catalog loading
//!
//! Reads a font, picks its Unicode cmap subtable and keeps the codepoints
//! that fall inside the emoji ranges. The resulting [`EmojiCatalog`] is the
//! only record of a loaded font; callers replace it on every load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::constants::{is_emoji_codepoint, LABEL_PREFIX};
use crate::error::{ExtractError, Result};
use crate::font::cmap::{Cmap, EncodingRecord};
use crate::font::color_tables::{ColorFormat, ColorGlyphIndex};
use crate::font::glyphs;
use crate::font::sfnt::FontFile;

/// One listed emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiEntry {
    pub codepoint: u32,
    /// Display label ("U+1F600")
    pub label: String,
    pub glyph_id: u16,
    pub glyph_name: String,
    /// Color table the glyph is drawn from, if any
    pub color: Option<ColorFormat>,
}

/// Emoji codepoints of one successfully loaded font
#[derive(Debug, Clone)]
pub struct EmojiCatalog {
    path: PathBuf,
    subtable: EncodingRecord,
    entries: Vec<EmojiEntry>,
    by_label: HashMap<String, u32>,
}

impl EmojiCatalog {
    /// Read and scan a font file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("EmojiCatalog: loading from {:?}", path);
        let data = std::fs::read(path).map_err(|source| ExtractError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("EmojiCatalog: {} bytes read", data.len());
        Self::from_bytes(path, &data)
    }

    /// Scan font data already in memory
    pub fn from_bytes<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<Self> {
        let font = FontFile::parse(data)?;
        let cmap_data = font
            .table(b"cmap")
            .ok_or_else(|| ExtractError::FontParse("'cmap' table not found".to_string()))?;
        let cmap = Cmap::parse(cmap_data)?;
        let subtable = cmap.unicode_subtable().ok_or(ExtractError::NoUnicodeCmap)?;

        let face = glyphs::open_face(data);
        let colors = ColorGlyphIndex::build(&font, face.as_ref());
        if colors.is_empty() {
            debug!("EmojiCatalog: no color glyphs, entries are outline-only");
        }

        // BTreeMap keys come out sorted and unique
        let entries: Vec<EmojiEntry> = subtable
            .mappings()?
            .into_iter()
            .filter(|(cp, _)| is_emoji_codepoint(*cp))
            .map(|(codepoint, glyph_id)| EmojiEntry {
                codepoint,
                label: format_label(codepoint),
                glyph_id,
                glyph_name: glyphs::glyph_name(face.as_ref(), glyph_id),
                color: colors.get(glyph_id).map(|c| c.format),
            })
            .collect();

        let by_label = entries
            .iter()
            .map(|e| (e.label.clone(), e.codepoint))
            .collect();

        info!(
            "EmojiCatalog: {} emoji codepoints via cmap ({}, {}) format {}",
            entries.len(),
            subtable.record().platform_id,
            subtable.record().encoding_id,
            subtable.format()
        );

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            subtable: subtable.record(),
            entries,
            by_label,
        })
    }

    /// Font file this catalog was built from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// cmap encoding record the codepoints were read from
    pub fn subtable(&self) -> EncodingRecord {
        self.subtable
    }

    /// Entries sorted by codepoint
    pub fn entries(&self) -> &[EmojiEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codepoint for a display label
    pub fn codepoint(&self, label: &str) -> Option<u32> {
        self.by_label.get(label).copied()
    }

    pub fn entry(&self, label: &str) -> Option<&EmojiEntry> {
        let cp = self.codepoint(label)?;
        self.entries
            .binary_search_by_key(&cp, |e| e.codepoint)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Labels in display order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

/// Display label of a codepoint: "U+" and at least four uppercase hex digits
pub fn format_label(codepoint: u32) -> String {
    format!("{}{:04X}", LABEL_PREFIX, codepoint)
}

/// Parse user input naming a codepoint: "U+1F600", "u+1f600" or "1F600"
pub fn parse_label(text: &str) -> Option<u32> {
    let text = text.trim();
    let hex = text
        .strip_prefix(LABEL_PREFIX)
        .or_else(|| text.strip_prefix("u+"))
        .unwrap_or(text);
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().filter(|&cp| cp <= 0x10FFFF)
}
