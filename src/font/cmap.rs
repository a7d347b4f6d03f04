//! cmap table parsing
//!
//! Decodes the encoding records of a 'cmap' table and the two subtable
//! formats that matter for Unicode fonts: format 4 (BMP segments) and
//! format 12 (sequential groups covering the full repertoire).

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::error::{ExtractError, Result};
use crate::font::sfnt::{read_i16, read_u16, read_u32};

/// Highest valid Unicode scalar value
const MAX_CODEPOINT: u32 = 0x10FFFF;

/// Preference order used to pick the best cmap for glyph lookup
const BEST_CMAP_ORDER: [(u16, u16); 8] = [
    (3, 10),
    (0, 6),
    (0, 4),
    (3, 1),
    (0, 3),
    (0, 2),
    (0, 1),
    (0, 0),
];

/// One encoding record of the cmap table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Subtable format (0 when the subtable offset is unreadable)
    pub format: u16,
    /// Subtable offset from the start of the cmap table
    offset: usize,
}

impl EncodingRecord {
    /// Unicode platform, or Windows with a Unicode BMP/full encoding
    pub fn is_unicode(&self) -> bool {
        self.platform_id == 0
            || (self.platform_id == 3 && (self.encoding_id == 1 || self.encoding_id == 10))
    }

    fn is_supported_format(&self) -> bool {
        self.format == 4 || self.format == 12
    }
}

/// Parsed cmap table
pub struct Cmap<'a> {
    data: &'a [u8],
    records: Vec<EncodingRecord>,
}

impl<'a> Cmap<'a> {
    /// Parse the encoding record list of a cmap table
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let num_tables = read_u16(data, 2)? as usize;
        let mut records = Vec::with_capacity(num_tables);

        for i in 0..num_tables {
            let record_offset = 4 + i * 8;
            let platform_id = read_u16(data, record_offset)?;
            let encoding_id = read_u16(data, record_offset + 2)?;
            let offset = read_u32(data, record_offset + 4)? as usize;

            let format = match read_u16(data, offset) {
                Ok(format) => format,
                Err(_) => {
                    warn!(
                        "cmap: subtable ({}, {}) offset {} out of bounds",
                        platform_id, encoding_id, offset
                    );
                    0
                }
            };

            trace!(
                "cmap: record platform={} encoding={} format={} offset={}",
                platform_id,
                encoding_id,
                format,
                offset
            );

            records.push(EncodingRecord {
                platform_id,
                encoding_id,
                format,
                offset,
            });
        }

        Ok(Self { data, records })
    }

    pub fn records(&self) -> &[EncodingRecord] {
        &self.records
    }

    /// Subtable used to enumerate emoji codepoints.
    ///
    /// A Unicode format 12 subtable is taken first because format 4 cannot
    /// encode anything above U+FFFF; otherwise the first Unicode format 4.
    pub fn unicode_subtable(&self) -> Option<Subtable<'a>> {
        let record = self
            .records
            .iter()
            .find(|r| r.is_unicode() && r.format == 12)
            .or_else(|| self.records.iter().find(|r| r.is_unicode() && r.format == 4))?;
        debug!(
            "cmap: using ({}, {}) format {} for listing",
            record.platform_id, record.encoding_id, record.format
        );
        self.subtable(record)
    }

    /// Best subtable for codepoint lookup, in the usual platform preference order
    pub fn best_subtable(&self) -> Option<Subtable<'a>> {
        BEST_CMAP_ORDER.iter().find_map(|&(platform, encoding)| {
            let record = self.records.iter().find(|r| {
                r.platform_id == platform && r.encoding_id == encoding && r.is_supported_format()
            })?;
            self.subtable(record)
        })
    }

    fn subtable(&self, record: &EncodingRecord) -> Option<Subtable<'a>> {
        let data = self.data.get(record.offset..)?;
        Some(Subtable {
            record: *record,
            data,
        })
    }
}

/// A format 4 or format 12 subtable
#[derive(Clone, Copy)]
pub struct Subtable<'a> {
    record: EncodingRecord,
    data: &'a [u8],
}

impl<'a> Subtable<'a> {
    pub fn record(&self) -> EncodingRecord {
        self.record
    }

    pub fn format(&self) -> u16 {
        self.record.format
    }

    /// Decode every codepoint -> glyph id mapping (glyph 0 omitted)
    pub fn mappings(&self) -> Result<BTreeMap<u32, u16>> {
        let mut map = BTreeMap::new();
        match self.record.format {
            4 => parse_format4(self.data, &mut map)?,
            12 => parse_format12(self.data, &mut map)?,
            other => {
                return Err(ExtractError::FontParse(format!(
                    "unsupported cmap subtable format {}",
                    other
                )))
            }
        }
        Ok(map)
    }

    /// Glyph id for one codepoint
    pub fn glyph_index(&self, codepoint: u32) -> Result<Option<u16>> {
        match self.record.format {
            4 => format4_lookup(self.data, codepoint),
            12 => format12_lookup(self.data, codepoint),
            _ => Ok(None),
        }
    }
}

/// Segment arrays of a format 4 subtable
struct Format4Segments {
    seg_count: usize,
}

impl Format4Segments {
    fn read(data: &[u8]) -> Result<Self> {
        let seg_count = (read_u16(data, 6)? / 2) as usize;
        Ok(Self { seg_count })
    }

    fn end_code(&self, data: &[u8], i: usize) -> Result<u16> {
        read_u16(data, 14 + i * 2)
    }

    fn start_code(&self, data: &[u8], i: usize) -> Result<u16> {
        read_u16(data, 16 + self.seg_count * 2 + i * 2)
    }

    fn id_delta(&self, data: &[u8], i: usize) -> Result<i16> {
        read_i16(data, 16 + self.seg_count * 4 + i * 2)
    }

    /// Position of idRangeOffset[i] within the subtable
    fn range_offset_pos(&self, i: usize) -> usize {
        16 + self.seg_count * 6 + i * 2
    }

    /// Glyph id of `c` inside segment `i`; 0 means unmapped
    fn glyph_for(&self, data: &[u8], i: usize, start: u16, c: u16) -> Result<u16> {
        let delta = self.id_delta(data, i)?;
        let pos = self.range_offset_pos(i);
        let range_offset = read_u16(data, pos)? as usize;

        if range_offset == 0 {
            // idDelta arithmetic is modulo 65536
            return Ok(c.wrapping_add(delta as u16));
        }

        let addr = pos + range_offset + (c - start) as usize * 2;
        let glyph = read_u16(data, addr)?;
        if glyph == 0 {
            Ok(0)
        } else {
            Ok(glyph.wrapping_add(delta as u16))
        }
    }
}

fn parse_format4(data: &[u8], map: &mut BTreeMap<u32, u16>) -> Result<()> {
    let segments = Format4Segments::read(data)?;

    for i in 0..segments.seg_count {
        let end = segments.end_code(data, i)?;
        let start = segments.start_code(data, i)?;
        if start > end {
            trace!("cmap format 4: segment {} has start > end, skipped", i);
            continue;
        }

        for c in start..=end {
            // 0xFFFF closes the final sentinel segment
            if c == 0xFFFF {
                break;
            }
            let glyph = segments.glyph_for(data, i, start, c)?;
            if glyph != 0 {
                map.insert(c as u32, glyph);
            }
        }
    }
    Ok(())
}

fn format4_lookup(data: &[u8], codepoint: u32) -> Result<Option<u16>> {
    if codepoint >= 0xFFFF {
        return Ok(None);
    }
    let c = codepoint as u16;
    let segments = Format4Segments::read(data)?;

    for i in 0..segments.seg_count {
        let end = segments.end_code(data, i)?;
        if c > end {
            continue;
        }
        let start = segments.start_code(data, i)?;
        if c < start {
            return Ok(None);
        }
        let glyph = segments.glyph_for(data, i, start, c)?;
        return Ok((glyph != 0).then_some(glyph));
    }
    Ok(None)
}

/// (startCharCode, endCharCode, startGlyphID) groups of a format 12 subtable
fn format12_groups(data: &[u8]) -> Result<impl Iterator<Item = Result<(u32, u32, u32)>> + '_> {
    let num_groups = read_u32(data, 12)? as usize;
    Ok((0..num_groups).map(move |i| {
        let offset = 16 + i * 12;
        Ok((
            read_u32(data, offset)?,
            read_u32(data, offset + 4)?,
            read_u32(data, offset + 8)?,
        ))
    }))
}

fn parse_format12(data: &[u8], map: &mut BTreeMap<u32, u16>) -> Result<()> {
    for group in format12_groups(data)? {
        let (start, end, start_glyph) = group?;
        if start > end || start > MAX_CODEPOINT {
            trace!("cmap format 12: invalid group {:X}-{:X} skipped", start, end);
            continue;
        }

        for cp in start..=end.min(MAX_CODEPOINT) {
            let glyph = start_glyph as u64 + (cp - start) as u64;
            if glyph > u16::MAX as u64 {
                break;
            }
            if glyph != 0 {
                map.insert(cp, glyph as u16);
            }
        }
    }
    Ok(())
}

fn format12_lookup(data: &[u8], codepoint: u32) -> Result<Option<u16>> {
    for group in format12_groups(data)? {
        let (start, end, start_glyph) = group?;
        if (start..=end).contains(&codepoint) {
            let glyph = start_glyph as u64 + (codepoint - start) as u64;
            return Ok(u16::try_from(glyph).ok().filter(|&g| g != 0));
        }
    }
    Ok(None)
}
