//! sfnt container parsing
//!
//! Reads the OpenType table directory so the other modules can work on
//! per-table slices. Font collections (TTC) resolve to their first font.

use std::collections::BTreeMap;

use bitflags::bitflags;
use log::{debug, info, trace, warn};

use crate::error::{ExtractError, Result};

/// TrueType outlines
const SFNT_TRUETYPE: u32 = 0x0001_0000;
/// Apple TrueType ('true')
const SFNT_APPLE_TRUE: u32 = 0x7472_7565;
/// CFF outlines ('OTTO')
const SFNT_OPENTYPE: u32 = 0x4F54_544F;
/// Font collection ('ttcf')
const SFNT_COLLECTION: u32 = 0x7474_6366;

bitflags! {
    /// Color glyph tables present in a font
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ColorTables: u8 {
        const CBDT = 1;
        const COLR = 1 << 1;
        const SBIX = 1 << 2;
        const SVG = 1 << 3;
    }
}

impl ColorTables {
    /// Human readable list ("CBDT, COLR") or "none"
    pub fn describe(self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        let names: Vec<&str> = [
            (ColorTables::CBDT, "CBDT"),
            (ColorTables::COLR, "COLR"),
            (ColorTables::SBIX, "sbix"),
            (ColorTables::SVG, "SVG"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        names.join(", ")
    }
}

/// One table directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub offset: usize,
    pub length: usize,
}

/// Parsed sfnt table directory over borrowed font data
pub struct FontFile<'a> {
    data: &'a [u8],
    sfnt_version: u32,
    tables: BTreeMap<[u8; 4], TableRecord>,
}

impl<'a> FontFile<'a> {
    /// Parse the table directory of a font or of the first font in a collection
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < 12 {
            return Err(ExtractError::FontParse(format!(
                "data too short for an sfnt header ({} bytes)",
                data.len()
            )));
        }

        let sfnt_version = read_u32(data, 0)?;
        trace!("FontFile: sfnt_version = 0x{:08X}", sfnt_version);

        match sfnt_version {
            SFNT_TRUETYPE | SFNT_APPLE_TRUE | SFNT_OPENTYPE => Self::parse_at(data, 0),
            SFNT_COLLECTION => {
                let num_fonts = read_u32(data, 8)?;
                if num_fonts == 0 {
                    return Err(ExtractError::FontParse(
                        "font collection contains no fonts".to_string(),
                    ));
                }
                let font_offset = read_u32(data, 12)? as usize;
                info!(
                    "FontFile: collection with {} fonts, using the first (offset {})",
                    num_fonts, font_offset
                );
                Self::parse_at(data, font_offset)
            }
            other => Err(ExtractError::FontParse(format!(
                "unknown font format 0x{:08X}",
                other
            ))),
        }
    }

    fn parse_at(data: &'a [u8], font_offset: usize) -> Result<Self> {
        let sfnt_version = read_u32(data, font_offset)?;
        if !matches!(sfnt_version, SFNT_TRUETYPE | SFNT_APPLE_TRUE | SFNT_OPENTYPE) {
            return Err(ExtractError::FontParse(format!(
                "unknown font format 0x{:08X} at offset {}",
                sfnt_version, font_offset
            )));
        }

        let num_tables = read_u16(data, font_offset + 4)? as usize;
        debug!("FontFile: {} tables found", num_tables);

        let mut tables = BTreeMap::new();
        for i in 0..num_tables {
            let entry = font_offset + 12 + i * 16;
            let tag = read_tag(data, entry)?;
            let offset = read_u32(data, entry + 8)? as usize;
            let length = read_u32(data, entry + 12)? as usize;

            let in_bounds = offset
                .checked_add(length)
                .map_or(false, |end| end <= data.len());
            if !in_bounds {
                warn!(
                    "FontFile: table '{}' ({} bytes at {}) lies outside the file, ignored",
                    tag_name(&tag),
                    length,
                    offset
                );
                continue;
            }

            trace!("FontFile: table '{}' at offset {}", tag_name(&tag), offset);
            tables.insert(tag, TableRecord { offset, length });
        }

        Ok(Self {
            data,
            sfnt_version,
            tables,
        })
    }

    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// Slice of a table, if present
    pub fn table(&self, tag: &[u8; 4]) -> Option<&'a [u8]> {
        let record = self.tables.get(tag)?;
        Some(&self.data[record.offset..record.offset + record.length])
    }

    pub fn has_table(&self, tag: &[u8; 4]) -> bool {
        self.tables.contains_key(tag)
    }

    /// Table tags with their directory records, in tag order
    pub fn tables(&self) -> impl Iterator<Item = (&[u8; 4], &TableRecord)> {
        self.tables.iter()
    }

    /// Glyph count from the 'maxp' table
    pub fn num_glyphs(&self) -> Result<u16> {
        let maxp = self
            .table(b"maxp")
            .ok_or_else(|| ExtractError::FontParse("'maxp' table not found".to_string()))?;
        read_u16(maxp, 4)
    }

    /// Which color glyph tables the font carries
    pub fn color_tables(&self) -> ColorTables {
        let mut flags = ColorTables::empty();
        if self.has_table(b"CBLC") && self.has_table(b"CBDT") {
            flags |= ColorTables::CBDT;
        }
        if self.has_table(b"COLR") {
            flags |= ColorTables::COLR;
        }
        if self.has_table(b"sbix") {
            flags |= ColorTables::SBIX;
        }
        if self.has_table(b"SVG ") {
            flags |= ColorTables::SVG;
        }
        flags
    }
}

/// Printable form of a table tag
pub fn tag_name(tag: &[u8; 4]) -> String {
    String::from_utf8_lossy(tag).into_owned()
}

// Helper functions
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8> {
    data.get(offset)
        .copied()
        .ok_or_else(|| ExtractError::truncated("font data", offset))
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    match data.get(offset..offset + 2) {
        Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
        None => Err(ExtractError::truncated("font data", offset)),
    }
}

pub(crate) fn read_i16(data: &[u8], offset: usize) -> Result<i16> {
    read_u16(data, offset).map(|v| v as i16)
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(ExtractError::truncated("font data", offset)),
    }
}

pub(crate) fn read_tag(data: &[u8], offset: usize) -> Result<[u8; 4]> {
    match data.get(offset..offset + 4) {
        Some(b) => Ok([b[0], b[1], b[2], b[3]]),
        None => Err(ExtractError::truncated("font data", offset)),
    }
}
