//! Glyph-level queries backed by the shaping face
//!
//! Glyph names ('post' table) and outline bounding boxes come from the
//! rustybuzz face. Fonts the face parser rejects still work for everything
//! else: names fall back to `glyphNNNNN` and outlines count as absent.

use log::debug;
use rustybuzz::ttf_parser::GlyphId;
use rustybuzz::Face;

/// Parse a shaping face for the first font of the file
pub fn open_face(data: &[u8]) -> Option<Face<'_>> {
    let face = Face::from_slice(data, 0);
    if face.is_none() {
        debug!("rustybuzz: face could not be parsed, glyph names and outlines unavailable");
    }
    face
}

/// Glyph name from the font, or the conventional `glyphNNNNN` form
pub fn glyph_name(face: Option<&Face<'_>>, glyph_id: u16) -> String {
    face.and_then(|f| f.glyph_name(GlyphId(glyph_id)))
        .map(str::to_owned)
        .unwrap_or_else(|| format!("glyph{:05}", glyph_id))
}

/// Outline bounding box size in font units, if the glyph has an outline
pub fn outline_extent(face: Option<&Face<'_>>, glyph_id: u16) -> Option<(u32, u32)> {
    let rect = face?.glyph_bounding_box(GlyphId(glyph_id))?;
    Some(rect_extent(rect.x_min, rect.y_min, rect.x_max, rect.y_max))
}

/// Union of several outline boxes, in font units
pub fn union_extent(face: Option<&Face<'_>>, glyph_ids: &[u16]) -> Option<(u32, u32)> {
    let face = face?;
    let mut bounds: Option<(i16, i16, i16, i16)> = None;
    for &gid in glyph_ids {
        if let Some(rect) = face.glyph_bounding_box(GlyphId(gid)) {
            bounds = Some(match bounds {
                None => (rect.x_min, rect.y_min, rect.x_max, rect.y_max),
                Some((x0, y0, x1, y1)) => (
                    x0.min(rect.x_min),
                    y0.min(rect.y_min),
                    x1.max(rect.x_max),
                    y1.max(rect.y_max),
                ),
            });
        }
    }
    let (x0, y0, x1, y1) = bounds.unwrap_or((0, 0, 0, 0));
    Some(rect_extent(x0, y0, x1, y1))
}

fn rect_extent(x_min: i16, y_min: i16, x_max: i16, y_max: i16) -> (u32, u32) {
    let width = (x_max as i32 - x_min as i32).max(0) as u32;
    let height = (y_max as i32 - y_min as i32).max(0) as u32;
    (width, height)
}
