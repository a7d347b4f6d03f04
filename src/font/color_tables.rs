//! Color glyph index
//!
//! Determines which glyphs have a color representation and in which table:
//! - CBDT/CBLC: Bitmap format (Noto Color Emoji, etc.)
//! - COLR: Vector format (v0 layers, v1 paint graphs)
//! - sbix: Apple bitmap strikes
//! - SVG: Embedded SVG documents
//!
//! Only the index structures are read. Pixel data is never decoded; the
//! index exists so rendering can tell a color glyph from an empty one.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, trace, warn};
use rustybuzz::Face;

use crate::error::Result;
use crate::font::glyphs;
use crate::font::sfnt::{read_u16, read_u32, read_u8, ColorTables, FontFile};

/// PNG file signature
const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// Table a color glyph comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Cbdt,
    ColrV0,
    ColrV1,
    Sbix,
    Svg,
}

impl ColorFormat {
    /// Short tag used in listings
    pub fn tag(self) -> &'static str {
        match self {
            Self::Cbdt => "CBDT",
            Self::ColrV0 => "COLRv0",
            Self::ColrV1 => "COLRv1",
            Self::Sbix => "sbix",
            Self::Svg => "SVG",
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cbdt => "CBDT color bitmaps",
            Self::ColrV0 => "COLRv0 color layers",
            Self::ColrV1 => "COLRv1 color paint graphs",
            Self::Sbix => "sbix color bitmaps",
            Self::Svg => "SVG color documents",
        };
        f.write_str(name)
    }
}

/// Color representation of one glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorGlyph {
    pub format: ColorFormat,
    /// Width and height (pixels for bitmaps, font units for COLR) when known
    pub extent: Option<(u32, u32)>,
}

/// Glyph id -> color representation for one font
#[derive(Debug)]
pub struct ColorGlyphIndex {
    glyphs: HashMap<u16, ColorGlyph>,
    tables: ColorTables,
}

impl ColorGlyphIndex {
    /// Index every color table of the font.
    ///
    /// A malformed color table is logged and skipped; it never fails the
    /// font as a whole.
    pub fn build(font: &FontFile<'_>, face: Option<&Face<'_>>) -> Self {
        let tables = font.color_tables();
        let mut index = Self {
            glyphs: HashMap::new(),
            tables,
        };

        if tables.contains(ColorTables::CBDT) {
            if let (Some(cblc), Some(cbdt)) = (font.table(b"CBLC"), font.table(b"CBDT")) {
                if let Err(e) = index.parse_cblc(cblc, cbdt) {
                    warn!("CBLC: index unreadable: {}", e);
                }
            }
        }
        if let Some(colr) = font.table(b"COLR") {
            if let Err(e) = index.parse_colr(colr, face) {
                warn!("COLR: index unreadable: {}", e);
            }
        }
        if let Some(sbix) = font.table(b"sbix") {
            match font.num_glyphs() {
                Ok(num_glyphs) => {
                    if let Err(e) = index.parse_sbix(sbix, num_glyphs) {
                        warn!("sbix: index unreadable: {}", e);
                    }
                }
                Err(e) => warn!("sbix: glyph count unavailable: {}", e),
            }
        }
        if let Some(svg) = font.table(b"SVG ") {
            if let Err(e) = index.parse_svg(svg) {
                warn!("SVG: index unreadable: {}", e);
            }
        }

        info!(
            "ColorGlyphIndex: {} color glyphs (tables: {})",
            index.glyphs.len(),
            tables.describe()
        );
        index
    }

    pub fn get(&self, glyph_id: u16) -> Option<ColorGlyph> {
        self.glyphs.get(&glyph_id).copied()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Color tables present in the font
    pub fn tables(&self) -> ColorTables {
        self.tables
    }

    /// First table to describe a glyph wins
    fn insert(&mut self, glyph_id: u16, glyph: ColorGlyph) {
        self.glyphs.entry(glyph_id).or_insert(glyph);
    }

    /// Parse CBLC index subtables of the strike with the largest ppem
    fn parse_cblc(&mut self, cblc: &[u8], cbdt: &[u8]) -> Result<()> {
        let major_version = read_u16(cblc, 0)?;
        if major_version != 2 && major_version != 3 {
            warn!("CBLC: unsupported version {}", major_version);
            return Ok(());
        }

        let num_sizes = read_u32(cblc, 4)? as usize;
        let mut best: Option<(u8, usize)> = None;
        for i in 0..num_sizes {
            let strike_offset = 8 + i * 48;
            let ppem_y = read_u8(cblc, strike_offset + 45)?;
            trace!("CBLC: strike {} ppem={}", i, ppem_y);
            if best.map_or(true, |(ppem, _)| ppem_y > ppem) {
                best = Some((ppem_y, strike_offset));
            }
        }

        let Some((ppem, strike_offset)) = best else {
            warn!("CBLC: no bitmap strikes");
            return Ok(());
        };
        debug!("CBLC: using strike with ppem={}", ppem);

        let array_offset = read_u32(cblc, strike_offset)? as usize;
        let num_subtables = read_u32(cblc, strike_offset + 8)? as usize;

        for i in 0..num_subtables {
            let entry = array_offset + i * 8;
            let first_glyph = read_u16(cblc, entry)?;
            let last_glyph = read_u16(cblc, entry + 2)?;
            let header = array_offset + read_u32(cblc, entry + 4)? as usize;
            if last_glyph < first_glyph {
                warn!("CBLC: subtable {} has an inverted glyph range", i);
                continue;
            }

            let index_format = read_u16(cblc, header)?;
            let image_format = read_u16(cblc, header + 2)?;
            let image_data_offset = read_u32(cblc, header + 4)? as usize;
            trace!(
                "CBLC: subtable {} glyphs {}-{}, indexFormat={}, imageFormat={}",
                i,
                first_glyph,
                last_glyph,
                index_format,
                image_format
            );

            let bitmaps = cblc_subtable_glyphs(cblc, header, index_format, first_glyph, last_glyph)?;
            for (glyph_id, location) in bitmaps {
                let extent = match location {
                    BitmapLocation::Offset(offset) => {
                        cbdt_extent(cbdt, image_data_offset + offset, image_format)
                    }
                    BitmapLocation::Fixed(width, height) => Some((width, height)),
                };
                self.insert(
                    glyph_id,
                    ColorGlyph {
                        format: ColorFormat::Cbdt,
                        extent,
                    },
                );
            }
        }
        Ok(())
    }

    /// Parse COLR base glyph records (v0) and the v1 base glyph paint list
    fn parse_colr(&mut self, colr: &[u8], face: Option<&Face<'_>>) -> Result<()> {
        let version = read_u16(colr, 0)?;
        let num_base_glyphs = read_u16(colr, 2)? as usize;
        let base_glyph_offset = read_u32(colr, 4)? as usize;
        let layer_records_offset = read_u32(colr, 8)? as usize;
        debug!("COLR: version={}, {} v0 base glyphs", version, num_base_glyphs);

        // BaseGlyphRecord: glyph_id (u16), first_layer_idx (u16), num_layers (u16)
        for i in 0..num_base_glyphs {
            let record = base_glyph_offset + i * 6;
            let glyph_id = read_u16(colr, record)?;
            let first_layer = read_u16(colr, record + 2)? as usize;
            let num_layers = read_u16(colr, record + 4)? as usize;

            // LayerRecord: glyph_id (u16), palette_index (u16)
            let mut layer_glyphs = Vec::with_capacity(num_layers);
            for j in 0..num_layers {
                let layer = layer_records_offset + (first_layer + j) * 4;
                layer_glyphs.push(read_u16(colr, layer)?);
            }

            self.insert(
                glyph_id,
                ColorGlyph {
                    format: ColorFormat::ColrV0,
                    extent: glyphs::union_extent(face, &layer_glyphs),
                },
            );
        }

        if version >= 1 {
            let list_offset = read_u32(colr, 14)? as usize;
            if list_offset != 0 {
                let count = read_u32(colr, list_offset)? as usize;
                debug!("COLR: {} v1 base glyph paint records", count);
                for i in 0..count {
                    let glyph_id = read_u16(colr, list_offset + 4 + i * 6)?;
                    self.insert(
                        glyph_id,
                        ColorGlyph {
                            format: ColorFormat::ColrV1,
                            extent: None,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Parse the sbix strike with the largest ppem
    fn parse_sbix(&mut self, sbix: &[u8], num_glyphs: u16) -> Result<()> {
        let num_strikes = read_u32(sbix, 4)? as usize;
        let mut best: Option<(u16, usize)> = None;
        for i in 0..num_strikes {
            let strike = read_u32(sbix, 8 + i * 4)? as usize;
            let ppem = read_u16(sbix, strike)?;
            if best.map_or(true, |(p, _)| ppem > p) {
                best = Some((ppem, strike));
            }
        }
        let Some((ppem, strike)) = best else {
            return Ok(());
        };
        debug!("sbix: using strike with ppem={}", ppem);

        for glyph_id in 0..num_glyphs {
            let slot = strike + 4 + glyph_id as usize * 4;
            let start = read_u32(sbix, slot)? as usize;
            let end = read_u32(sbix, slot + 4)? as usize;
            // originX, originY, graphicType precede the data
            if end <= start + 8 {
                continue;
            }
            let record = strike + start;
            let graphic_type = sbix.get(record + 4..record + 8);
            let extent = match graphic_type {
                Some(t) if t == b"png " => sbix
                    .get(record + 8..strike + end)
                    .and_then(png_dimensions),
                _ => None,
            };
            self.insert(
                glyph_id,
                ColorGlyph {
                    format: ColorFormat::Sbix,
                    extent,
                },
            );
        }
        Ok(())
    }

    /// Parse the SVG document index
    fn parse_svg(&mut self, svg: &[u8]) -> Result<()> {
        let list = read_u32(svg, 2)? as usize;
        let num_entries = read_u16(svg, list)? as usize;
        for i in 0..num_entries {
            let entry = list + 2 + i * 12;
            let start = read_u16(svg, entry)?;
            let end = read_u16(svg, entry + 2)?;
            for glyph_id in start..=end {
                self.insert(
                    glyph_id,
                    ColorGlyph {
                        format: ColorFormat::Svg,
                        extent: None,
                    },
                );
            }
        }
        Ok(())
    }
}

/// Where the CBDT record of a glyph lives
enum BitmapLocation {
    /// Offset relative to the subtable's image data offset
    Offset(usize),
    /// Shared big metrics (index formats 2 and 5)
    Fixed(u32, u32),
}

/// Glyphs present in one CBLC index subtable
fn cblc_subtable_glyphs(
    cblc: &[u8],
    header: usize,
    index_format: u16,
    first_glyph: u16,
    last_glyph: u16,
) -> Result<Vec<(u16, BitmapLocation)>> {
    let num_glyphs = (last_glyph - first_glyph) as usize + 1;
    let mut found = Vec::new();

    match index_format {
        1 | 3 => {
            // Variable size images: 4-byte (format 1) or 2-byte (format 3) offsets
            let read_offset = |i: usize| -> Result<usize> {
                if index_format == 1 {
                    Ok(read_u32(cblc, header + 8 + i * 4)? as usize)
                } else {
                    Ok(read_u16(cblc, header + 8 + i * 2)? as usize)
                }
            };
            for i in 0..num_glyphs {
                let start = read_offset(i)?;
                let end = read_offset(i + 1)?;
                // Equal offsets mark a missing glyph
                if end > start {
                    found.push((first_glyph + i as u16, BitmapLocation::Offset(start)));
                }
            }
        }
        2 => {
            let (width, height) = big_metrics_extent(cblc, header + 12)?;
            for i in 0..num_glyphs {
                found.push((first_glyph + i as u16, BitmapLocation::Fixed(width, height)));
            }
        }
        4 => {
            // Sparse: (glyph id, offset) pairs, one extra pair closes the list
            let count = read_u32(cblc, header + 8)? as usize;
            for i in 0..count {
                let pair = header + 12 + i * 4;
                let glyph_id = read_u16(cblc, pair)?;
                let start = read_u16(cblc, pair + 2)? as usize;
                let end = read_u16(cblc, pair + 6)? as usize;
                if end > start {
                    found.push((glyph_id, BitmapLocation::Offset(start)));
                }
            }
        }
        5 => {
            let (width, height) = big_metrics_extent(cblc, header + 12)?;
            let count = read_u32(cblc, header + 20)? as usize;
            for i in 0..count {
                let glyph_id = read_u16(cblc, header + 24 + i * 2)?;
                found.push((glyph_id, BitmapLocation::Fixed(width, height)));
            }
        }
        _ => {
            trace!("CBLC: unsupported index format {}", index_format);
        }
    }
    Ok(found)
}

/// BigGlyphMetrics start with height, width
fn big_metrics_extent(data: &[u8], offset: usize) -> Result<(u32, u32)> {
    let height = read_u8(data, offset)? as u32;
    let width = read_u8(data, offset + 1)? as u32;
    Ok((width, height))
}

/// Pixel size of one CBDT record
fn cbdt_extent(cbdt: &[u8], offset: usize, image_format: u16) -> Option<(u32, u32)> {
    match image_format {
        // Small (17) and big (18) metrics both lead with height, width
        17 | 18 => big_metrics_extent(cbdt, offset).ok(),
        // Format 19 keeps metrics in CBLC; read the PNG header instead
        19 => {
            let len = read_u32(cbdt, offset).ok()? as usize;
            cbdt.get(offset + 4..offset + 4 + len).and_then(png_dimensions)
        }
        _ => {
            trace!("CBDT: unsupported image format {}", image_format);
            None
        }
    }
}

/// Width and height from a PNG IHDR chunk
pub fn png_dimensions(png: &[u8]) -> Option<(u32, u32)> {
    if png.len() < 24 || &png[..8] != PNG_SIGNATURE || &png[12..16] != b"IHDR" {
        return None;
    }
    let width = read_u32(png, 16).ok()?;
    let height = read_u32(png, 20).ok()?;
    Some((width, height))
}
