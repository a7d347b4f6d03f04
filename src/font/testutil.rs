//! Synthetic font builders for unit tests
//!
//! Produces just enough sfnt structure for the parsers in this crate.
//! Only [`outline_font`] is complete enough for the shaping and
//! rasterizing libraries.

/// Assembles an sfnt file from raw tables
pub struct FontBuilder {
    base_offset: usize,
    tables: Vec<([u8; 4], Vec<u8>)>,
}

impl FontBuilder {
    pub fn new() -> Self {
        Self {
            base_offset: 0,
            tables: Vec::new(),
        }
    }

    /// Offset at which the built font will be placed inside a larger file
    pub fn base_offset(mut self, offset: usize) -> Self {
        self.base_offset = offset;
        self
    }

    pub fn table(mut self, tag: &[u8; 4], data: Vec<u8>) -> Self {
        self.tables.push((*tag, data));
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.tables.sort_by(|a, b| a.0.cmp(&b.0));
        let num_tables = self.tables.len();

        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        push_u16(&mut out, num_tables as u16);
        push_u16(&mut out, 0); // searchRange
        push_u16(&mut out, 0); // entrySelector
        push_u16(&mut out, 0); // rangeShift

        let mut offset = self.base_offset + 12 + num_tables * 16;
        for (tag, data) in &self.tables {
            out.extend_from_slice(tag);
            push_u32(&mut out, 0); // checksum
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, data.len() as u32);
            offset += padded_len(data.len());
        }

        for (_, data) in &self.tables {
            out.extend_from_slice(data);
            out.resize(out.len() + padded_len(data.len()) - data.len(), 0);
        }
        out
    }
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

pub fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

pub fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// 'maxp' version 0.5
pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::new();
    push_u32(&mut out, 0x0000_5000);
    push_u16(&mut out, num_glyphs);
    out
}

/// 'cmap' table from (platform, encoding, subtable) triples
pub fn cmap(records: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u16(&mut out, records.len() as u16);

    let mut offset = 4 + records.len() * 8;
    for (platform, encoding, sub) in records {
        push_u16(&mut out, *platform);
        push_u16(&mut out, *encoding);
        push_u32(&mut out, offset as u32);
        offset += sub.len();
    }
    for (_, _, sub) in records {
        out.extend_from_slice(sub);
    }
    out
}

/// One format 4 segment
pub struct Segment {
    start: u16,
    end: u16,
    delta: i16,
    glyphs: Option<Vec<u16>>,
}

impl Segment {
    /// Segment mapped through idDelta
    pub fn delta(start: u16, end: u16, delta: i32) -> Self {
        Self {
            start,
            end,
            delta: delta as i16,
            glyphs: None,
        }
    }

    /// Segment mapped through the glyph id array
    pub fn glyphs(start: u16, glyphs: &[u16]) -> Self {
        Self {
            start,
            end: start + glyphs.len() as u16 - 1,
            delta: 0,
            glyphs: Some(glyphs.to_vec()),
        }
    }
}

/// Format 4 subtable; the 0xFFFF sentinel segment is appended
pub fn cmap_format4(segments: &[Segment]) -> Vec<u8> {
    let sentinel = Segment::delta(0xFFFF, 0xFFFF, 1);
    let all: Vec<&Segment> = segments.iter().chain(std::iter::once(&sentinel)).collect();
    let seg_count = all.len();

    let mut glyph_array: Vec<u16> = Vec::new();
    let mut range_offsets = Vec::with_capacity(seg_count);
    for (i, seg) in all.iter().enumerate() {
        match &seg.glyphs {
            Some(glyphs) => {
                let offset = 2 * (seg_count - i) + 2 * glyph_array.len();
                range_offsets.push(offset as u16);
                glyph_array.extend_from_slice(glyphs);
            }
            None => range_offsets.push(0),
        }
    }

    let length = 16 + seg_count * 8 + glyph_array.len() * 2;
    let mut out = Vec::with_capacity(length);
    push_u16(&mut out, 4);
    push_u16(&mut out, length as u16);
    push_u16(&mut out, 0); // language
    push_u16(&mut out, (seg_count * 2) as u16);
    push_u16(&mut out, 0); // searchRange
    push_u16(&mut out, 0); // entrySelector
    push_u16(&mut out, 0); // rangeShift
    for seg in &all {
        push_u16(&mut out, seg.end);
    }
    push_u16(&mut out, 0); // reservedPad
    for seg in &all {
        push_u16(&mut out, seg.start);
    }
    for seg in &all {
        push_u16(&mut out, seg.delta as u16);
    }
    for offset in &range_offsets {
        push_u16(&mut out, *offset);
    }
    for glyph in &glyph_array {
        push_u16(&mut out, *glyph);
    }
    out
}

/// Format 12 subtable from (start, end, start glyph) groups
pub fn cmap_format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 12);
    push_u16(&mut out, 0);
    push_u32(&mut out, (16 + groups.len() * 12) as u32);
    push_u32(&mut out, 0); // language
    push_u32(&mut out, groups.len() as u32);
    for &(start, end, glyph) in groups {
        push_u32(&mut out, start);
        push_u32(&mut out, end);
        push_u32(&mut out, glyph);
    }
    out
}

/// One CBLC index subtable: glyph range plus the subtable bytes
pub struct IndexSubtable {
    pub first: u16,
    pub last: u16,
    pub data: Vec<u8>,
}

fn index_header(out: &mut Vec<u8>, index_format: u16, image_format: u16, image_data_offset: u32) {
    push_u16(out, index_format);
    push_u16(out, image_format);
    push_u32(out, image_data_offset);
}

/// BigGlyphMetrics with the given size, bearings zero
fn big_metrics(out: &mut Vec<u8>, width: u8, height: u8) {
    out.extend_from_slice(&[height, width, 0, height, width, 0, 0, height]);
}

/// Index format 1: one 4-byte offset per glyph plus the closing offset
pub fn index_format1(first: u16, image_format: u16, image_data_offset: u32, offsets: &[u32]) -> IndexSubtable {
    let mut data = Vec::new();
    index_header(&mut data, 1, image_format, image_data_offset);
    for &offset in offsets {
        push_u32(&mut data, offset);
    }
    IndexSubtable {
        first,
        last: first + offsets.len() as u16 - 2,
        data,
    }
}

/// Index format 2: glyphs first..=last share one size
pub fn index_format2(first: u16, last: u16, width: u8, height: u8) -> IndexSubtable {
    let mut data = Vec::new();
    index_header(&mut data, 2, 17, 0);
    push_u32(&mut data, 0); // imageSize
    big_metrics(&mut data, width, height);
    IndexSubtable { first, last, data }
}

/// Index format 3: like format 1 with 2-byte offsets
pub fn index_format3(first: u16, image_format: u16, image_data_offset: u32, offsets: &[u16]) -> IndexSubtable {
    let mut data = Vec::new();
    index_header(&mut data, 3, image_format, image_data_offset);
    for &offset in offsets {
        push_u16(&mut data, offset);
    }
    IndexSubtable {
        first,
        last: first + offsets.len() as u16 - 2,
        data,
    }
}

/// Index format 4: sparse (glyph id, offset) pairs; `end` closes the last record
pub fn index_format4(image_format: u16, image_data_offset: u32, pairs: &[(u16, u16)], end: u16) -> IndexSubtable {
    let mut data = Vec::new();
    index_header(&mut data, 4, image_format, image_data_offset);
    push_u32(&mut data, pairs.len() as u32);
    for &(gid, offset) in pairs {
        push_u16(&mut data, gid);
        push_u16(&mut data, offset);
    }
    push_u16(&mut data, 0);
    push_u16(&mut data, end);
    IndexSubtable {
        first: pairs.first().map_or(0, |p| p.0),
        last: pairs.last().map_or(0, |p| p.0),
        data,
    }
}

/// Index format 5: listed glyph ids share one size
pub fn index_format5(glyph_ids: &[u16], width: u8, height: u8) -> IndexSubtable {
    let mut data = Vec::new();
    index_header(&mut data, 5, 17, 0);
    push_u32(&mut data, 0); // imageSize
    big_metrics(&mut data, width, height);
    push_u32(&mut data, glyph_ids.len() as u32);
    for &gid in glyph_ids {
        push_u16(&mut data, gid);
    }
    IndexSubtable {
        first: glyph_ids.first().copied().unwrap_or(0),
        last: glyph_ids.last().copied().unwrap_or(0),
        data,
    }
}

/// CBLC with one strike per (ppem, index subtables)
pub fn cblc(strikes: &[(u8, Vec<IndexSubtable>)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 3);
    push_u16(&mut out, 0);
    push_u32(&mut out, strikes.len() as u32);

    // BitmapSize records first, each strike's IndexSubTableArray and subtables after
    let mut blocks = Vec::new();
    let mut array_offset = 8 + strikes.len() * 48;
    for (ppem, subtables) in strikes {
        let mut block = Vec::new();
        let mut additional = subtables.len() * 8;
        for sub in subtables {
            push_u16(&mut block, sub.first);
            push_u16(&mut block, sub.last);
            push_u32(&mut block, additional as u32);
            additional += sub.data.len();
        }
        for sub in subtables {
            block.extend_from_slice(&sub.data);
        }

        push_u32(&mut out, array_offset as u32);
        push_u32(&mut out, block.len() as u32);
        push_u32(&mut out, subtables.len() as u32);
        push_u32(&mut out, 0); // colorRef
        out.extend_from_slice(&[0; 24]); // hori + vert line metrics
        push_u16(&mut out, subtables.iter().map(|s| s.first).min().unwrap_or(0));
        push_u16(&mut out, subtables.iter().map(|s| s.last).max().unwrap_or(0));
        out.extend_from_slice(&[*ppem, *ppem, 32, 1]);

        array_offset += block.len();
        blocks.push(block);
    }
    for block in blocks {
        out.extend_from_slice(&block);
    }
    out
}

/// CBDT header; records follow at offset 4
pub fn cbdt_header() -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 3);
    push_u16(&mut out, 0);
    out
}

/// CBDT image format 17 record: small metrics then PNG
pub fn cbdt_format17(width: u8, height: u8) -> Vec<u8> {
    let png = png_stub(width as u32, height as u32);
    let mut out = vec![height, width, 0, height, width];
    push_u32(&mut out, png.len() as u32);
    out.extend_from_slice(&png);
    out
}

/// CBDT image format 18 record: big metrics then PNG
pub fn cbdt_format18(width: u8, height: u8) -> Vec<u8> {
    let png = png_stub(width as u32, height as u32);
    let mut out = Vec::new();
    big_metrics(&mut out, width, height);
    push_u32(&mut out, png.len() as u32);
    out.extend_from_slice(&png);
    out
}

/// CBDT image format 19 record: PNG only, metrics live in CBLC
pub fn cbdt_format19(width: u32, height: u32) -> Vec<u8> {
    let png = png_stub(width, height);
    let mut out = Vec::new();
    push_u32(&mut out, png.len() as u32);
    out.extend_from_slice(&png);
    out
}

/// Single-strike CBLC/CBDT pair (index format 1, image format 17).
///
/// `glyphs` holds (glyph id, width, height), sorted by glyph id; ids in
/// between that are not listed get an empty entry.
pub fn cbdt_tables(ppem: u8, glyphs: &[(u16, u8, u8)]) -> (Vec<u8>, Vec<u8>) {
    let first = glyphs.first().map_or(0, |g| g.0);
    let last = glyphs.last().map_or(0, |g| g.0);

    let mut cbdt = cbdt_header();
    let image_data_offset = cbdt.len() as u32;

    let mut offsets = Vec::new();
    let mut cursor = 0u32;
    for gid in first..=last {
        offsets.push(cursor);
        if let Some(&(_, width, height)) = glyphs.iter().find(|g| g.0 == gid) {
            let record = cbdt_format17(width, height);
            cursor += record.len() as u32;
            cbdt.extend_from_slice(&record);
        }
    }
    offsets.push(cursor);

    let subtable = index_format1(first, 17, image_data_offset, &offsets);
    (cblc(&[(ppem, vec![subtable])]), cbdt)
}

/// COLR version 0 from (base glyph, first layer, layer count) and (layer glyph, palette index)
pub fn colr_v0(base: &[(u16, u16, u16)], layers: &[(u16, u16)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u16(&mut out, base.len() as u16);
    push_u32(&mut out, 14);
    push_u32(&mut out, (14 + base.len() * 6) as u32);
    push_u16(&mut out, layers.len() as u16);
    for &(gid, first, count) in base {
        push_u16(&mut out, gid);
        push_u16(&mut out, first);
        push_u16(&mut out, count);
    }
    for &(gid, palette) in layers {
        push_u16(&mut out, gid);
        push_u16(&mut out, palette);
    }
    out
}

/// COLR version 1: v0 base and layer records plus a BaseGlyphList whose
/// glyphs all point at one PaintSolid
pub fn colr_v1(base: &[(u16, u16, u16)], layers: &[(u16, u16)], paint_glyphs: &[u16]) -> Vec<u8> {
    const HEADER_LEN: usize = 34;
    let base_offset = HEADER_LEN;
    let layers_offset = base_offset + base.len() * 6;
    let list_offset = layers_offset + layers.len() * 4;

    let mut out = Vec::new();
    push_u16(&mut out, 1);
    push_u16(&mut out, base.len() as u16);
    push_u32(&mut out, base_offset as u32);
    push_u32(&mut out, layers_offset as u32);
    push_u16(&mut out, layers.len() as u16);
    push_u32(&mut out, list_offset as u32); // baseGlyphListOffset
    push_u32(&mut out, 0); // layerListOffset
    push_u32(&mut out, 0); // clipListOffset
    push_u32(&mut out, 0); // varIndexMapOffset
    push_u32(&mut out, 0); // itemVariationStoreOffset

    for &(gid, first, count) in base {
        push_u16(&mut out, gid);
        push_u16(&mut out, first);
        push_u16(&mut out, count);
    }
    for &(gid, palette) in layers {
        push_u16(&mut out, gid);
        push_u16(&mut out, palette);
    }

    // Paint offsets are relative to the BaseGlyphList
    let paint_offset = 4 + paint_glyphs.len() * 6;
    push_u32(&mut out, paint_glyphs.len() as u32);
    for &gid in paint_glyphs {
        push_u16(&mut out, gid);
        push_u32(&mut out, paint_offset as u32);
    }
    out.push(2); // PaintSolid
    push_u16(&mut out, 0); // paletteIndex
    push_u16(&mut out, 0x4000); // alpha 1.0
    out
}

/// 'SVG ' table with one document per (start, end) glyph range
pub fn svg_index(ranges: &[(u16, u16)]) -> Vec<u8> {
    const DOC: &[u8] = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";

    let mut out = Vec::new();
    push_u16(&mut out, 0);
    push_u32(&mut out, 10);
    push_u32(&mut out, 0);

    push_u16(&mut out, ranges.len() as u16);
    let docs_start = 2 + ranges.len() * 12;
    for (i, &(start, end)) in ranges.iter().enumerate() {
        push_u16(&mut out, start);
        push_u16(&mut out, end);
        push_u32(&mut out, (docs_start + i * DOC.len()) as u32);
        push_u32(&mut out, DOC.len() as u32);
    }
    for _ in ranges {
        out.extend_from_slice(DOC);
    }
    out
}

/// Single-strike 'sbix' table with PNG glyphs of the given (glyph id, width, height)
pub fn sbix(num_glyphs: u16, ppem: u16, glyphs: &[(u16, u32, u32)]) -> Vec<u8> {
    sbix_strikes(num_glyphs, &[(ppem, glyphs.to_vec())])
}

/// 'sbix' table with one strike per (ppem, PNG glyphs)
pub fn sbix_strikes(num_glyphs: u16, strikes: &[(u16, Vec<(u16, u32, u32)>)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_u16(&mut out, 1);
    push_u16(&mut out, 1);
    push_u32(&mut out, strikes.len() as u32);

    let mut encoded = Vec::new();
    for (ppem, glyphs) in strikes {
        // Strike header + offsets, then glyph records
        let mut strike = Vec::new();
        push_u16(&mut strike, *ppem);
        push_u16(&mut strike, 72);
        let header_len = 4 + (num_glyphs as usize + 1) * 4;
        let mut records = Vec::new();
        let mut offsets = Vec::new();
        for gid in 0..num_glyphs {
            offsets.push((header_len + records.len()) as u32);
            if let Some(&(_, width, height)) = glyphs.iter().find(|g| g.0 == gid) {
                push_u16(&mut records, 0);
                push_u16(&mut records, 0);
                records.extend_from_slice(b"png ");
                records.extend_from_slice(&png_stub(width, height));
            }
        }
        offsets.push((header_len + records.len()) as u32);
        for offset in offsets {
            push_u32(&mut strike, offset);
        }
        strike.extend_from_slice(&records);
        encoded.push(strike);
    }

    let mut offset = 8 + strikes.len() * 4;
    for strike in &encoded {
        push_u32(&mut out, offset as u32);
        offset += strike.len();
    }
    for strike in encoded {
        out.extend_from_slice(&strike);
    }
    out
}

/// PNG signature plus an IHDR chunk; enough for header probing
pub fn png_stub(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"\x89PNG\r\n\x1a\n");
    push_u32(&mut out, 13);
    out.extend_from_slice(b"IHDR");
    push_u32(&mut out, width);
    push_u32(&mut out, height);
    out.extend_from_slice(&[8, 6, 0, 0, 0]);
    push_u32(&mut out, 0); // CRC, unchecked
    out
}

/// Font with a cmap and maxp, plus any extra tables
pub fn emoji_font(
    cmap_records: &[(u16, u16, Vec<u8>)],
    num_glyphs: u16,
    extra: Vec<([u8; 4], Vec<u8>)>,
) -> Vec<u8> {
    let mut builder = FontBuilder::new()
        .table(b"cmap", cmap(cmap_records))
        .table(b"maxp", maxp(num_glyphs));
    for (tag, data) in extra {
        builder = builder.table(&tag, data);
    }
    builder.build()
}

/// Renderable TrueType font with three glyphs: .notdef (empty), one
/// rectangle with the given (x_min, y_min, x_max, y_max) in a 1000 unit em,
/// and an empty glyph. U+1F600 maps to the rectangle, U+1F601 to the empty
/// glyph.
pub fn outline_font(rect: (i16, i16, i16, i16), extra: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    let (x_min, y_min, x_max, y_max) = rect;

    // Simple glyph: one contour, four on-curve points, word-sized deltas
    let mut glyph = Vec::new();
    push_u16(&mut glyph, 1);
    for v in [x_min, y_min, x_max, y_max] {
        push_u16(&mut glyph, v as u16);
    }
    push_u16(&mut glyph, 3); // endPtsOfContours
    push_u16(&mut glyph, 0); // instructionLength
    glyph.extend_from_slice(&[0x01; 4]);
    for dx in [x_min, x_max - x_min, 0, x_min - x_max] {
        push_u16(&mut glyph, dx as u16);
    }
    for dy in [y_min, 0, y_max - y_min, 0] {
        push_u16(&mut glyph, dy as u16);
    }

    // Short loca stores offset / 2
    let mut loca = Vec::new();
    for offset in [0, 0, glyph.len(), glyph.len()] {
        push_u16(&mut loca, (offset / 2) as u16);
    }

    let mut head = Vec::new();
    push_u32(&mut head, 0x0001_0000); // version
    push_u32(&mut head, 0x0001_0000); // fontRevision
    push_u32(&mut head, 0); // checksumAdjustment
    push_u32(&mut head, 0x5F0F_3CF5); // magicNumber
    push_u16(&mut head, 0); // flags
    push_u16(&mut head, 1000); // unitsPerEm
    head.extend_from_slice(&[0; 16]); // created, modified
    for v in [x_min, y_min, x_max, y_max] {
        push_u16(&mut head, v as u16);
    }
    push_u16(&mut head, 0); // macStyle
    push_u16(&mut head, 8); // lowestRecPPEM
    push_u16(&mut head, 2); // fontDirectionHint
    push_u16(&mut head, 0); // indexToLocFormat: short
    push_u16(&mut head, 0); // glyphDataFormat

    let mut hhea = Vec::new();
    push_u32(&mut hhea, 0x0001_0000);
    push_u16(&mut hhea, 800); // ascender
    push_u16(&mut hhea, (-200i16) as u16); // descender
    push_u16(&mut hhea, 0); // lineGap
    push_u16(&mut hhea, 1000); // advanceWidthMax
    hhea.extend_from_slice(&[0; 22]);
    push_u16(&mut hhea, 3); // numberOfHMetrics

    let mut hmtx = Vec::new();
    for _ in 0..3 {
        push_u16(&mut hmtx, 1000);
        push_u16(&mut hmtx, 0);
    }

    let mut builder = FontBuilder::new()
        .table(b"cmap", cmap(&[(3, 10, cmap_format12(&[(0x1F600, 0x1F601, 1)]))]))
        .table(b"glyf", glyph)
        .table(b"head", head)
        .table(b"hhea", hhea)
        .table(b"hmtx", hmtx)
        .table(b"loca", loca)
        .table(b"maxp", maxp(3));
    for (tag, data) in extra {
        builder = builder.table(&tag, data);
    }
    builder.build()
}
