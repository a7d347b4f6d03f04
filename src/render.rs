//! Glyph rendering
//!
//! Resolves a codepoint through the font's best Unicode cmap and checks that
//! the glyph exists and has a drawable extent. Color glyph formats are never
//! rasterized: a glyph that passes the checks is reported as a capability
//! limitation, unless the monochrome outline fallback is enabled and the
//! glyph has an outline.

use std::path::Path;

use fontdue::{Font, FontSettings};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, info, warn};

use crate::constants::DEFAULT_EXPORT_SIZE;
use crate::error::{ExtractError, Result};
use crate::font::cmap::Cmap;
use crate::font::color_tables::ColorGlyphIndex;
use crate::font::glyphs;
use crate::font::sfnt::FontFile;

/// Render request settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Side of the square output image (pixels)
    pub size: u32,
    /// Rasterize glyph outlines when no color rendering is possible
    pub outline_fallback: bool,
    /// Outline fill color
    pub outline_color: (u8, u8, u8),
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_EXPORT_SIZE,
            outline_fallback: false,
            outline_color: (0, 0, 0),
        }
    }
}

/// Output of a successful render
#[derive(Debug, Clone)]
pub struct RenderedGlyph {
    pub image: RgbaImage,
    pub glyph_name: String,
}

/// Render the glyph of `codepoint`, re-reading the font from `path`
pub fn render_glyph_to_image(
    path: &Path,
    codepoint: u32,
    options: &RenderOptions,
) -> Result<RenderedGlyph> {
    let data = std::fs::read(path).map_err(|source| ExtractError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    render_from_bytes(&data, codepoint, options)
}

/// Render from font data already in memory
pub fn render_from_bytes(
    data: &[u8],
    codepoint: u32,
    options: &RenderOptions,
) -> Result<RenderedGlyph> {
    let font = FontFile::parse(data)?;
    let cmap_data = font
        .table(b"cmap")
        .ok_or_else(|| ExtractError::FontParse("'cmap' table not found".to_string()))?;
    let cmap = Cmap::parse(cmap_data)?;
    let subtable = cmap.best_subtable().ok_or(ExtractError::NoUnicodeCmap)?;

    let glyph_id = subtable
        .glyph_index(codepoint)?
        .ok_or(ExtractError::CodepointNotFound(codepoint))?;

    let face = glyphs::open_face(data);
    let glyph_name = glyphs::glyph_name(face.as_ref(), glyph_id);
    debug!(
        "Render: U+{:04X} -> glyph {} '{}' via cmap ({}, {})",
        codepoint,
        glyph_id,
        glyph_name,
        subtable.record().platform_id,
        subtable.record().encoding_id
    );

    if glyph_id >= font.num_glyphs()? {
        return Err(ExtractError::GlyphNotFound(glyph_name));
    }

    let outline = glyphs::outline_extent(face.as_ref(), glyph_id).filter(|&(w, h)| w > 0 && h > 0);
    let colors = ColorGlyphIndex::build(&font, face.as_ref());

    if let Some(color) = colors.get(glyph_id) {
        if matches!(color.extent, Some((w, h)) if w == 0 || h == 0) {
            return Err(ExtractError::DegenerateGlyph(glyph_name));
        }
        if !(options.outline_fallback && outline.is_some()) {
            return Err(ExtractError::CapabilityLimitation {
                codepoint,
                reason: format!("{} are not supported", color.format),
            });
        }
        warn!(
            "Render: glyph '{}' has {}, drawing its outline in one color instead",
            glyph_name, color.format
        );
    } else if outline.is_none() {
        return Err(ExtractError::DegenerateGlyph(glyph_name));
    } else if !options.outline_fallback {
        return Err(ExtractError::CapabilityLimitation {
            codepoint,
            reason: "monochrome outline rendering is disabled".to_string(),
        });
    }

    let image = rasterize_outline(data, glyph_id, &glyph_name, options)?;
    info!(
        "Render: glyph '{}' rasterized at {}px",
        glyph_name, options.size
    );
    Ok(RenderedGlyph { image, glyph_name })
}

fn rasterize_outline(
    data: &[u8],
    glyph_id: u16,
    glyph_name: &str,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    let font = Font::from_bytes(data, FontSettings::default())
        .map_err(|e| ExtractError::FontParse(format!("fontdue: {}", e)))?;
    let (metrics, coverage) = font.rasterize_indexed(glyph_id, options.size as f32);
    debug!(
        "Render: fontdue bitmap {}x{} for glyph {}",
        metrics.width, metrics.height, glyph_id
    );

    let bitmap = coverage_to_rgba(
        metrics.width as u32,
        metrics.height as u32,
        &coverage,
        options.outline_color,
    )
    .ok_or_else(|| ExtractError::DegenerateGlyph(glyph_name.to_string()))?;
    Ok(fit_into_square(&bitmap, options.size))
}

/// Coverage mask -> single color RGBA. None for an empty or mis-sized mask.
fn coverage_to_rgba(
    width: u32,
    height: u32,
    coverage: &[u8],
    color: (u8, u8, u8),
) -> Option<RgbaImage> {
    if width == 0 || height == 0 || coverage.len() != (width * height) as usize {
        return None;
    }
    let (r, g, b) = color;
    let rgba = coverage.iter().flat_map(|&a| [r, g, b, a]).collect();
    RgbaImage::from_raw(width, height, rgba)
}

/// Scale to fit a `size` x `size` transparent canvas, keeping the aspect
/// ratio, and center
fn fit_into_square(bitmap: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = bitmap.dimensions();
    let scale = size as f32 / width.max(height) as f32;
    let fit_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let fit_h = ((height as f32 * scale).round() as u32).clamp(1, size);

    let resized = imageops::resize(bitmap, fit_w, fit_h, FilterType::Lanczos3);
    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    imageops::replace(
        &mut canvas,
        &resized,
        ((size - fit_w) / 2) as i64,
        ((size - fit_h) / 2) as i64,
    );
    canvas
}
