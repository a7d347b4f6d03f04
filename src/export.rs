//! Image export
//!
//! Encodes a rendered RGBA image as PNG, GIF or JPG. JPG has no alpha
//! channel, so the image is flattened over a background color first.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, ImageError, ImageOutputFormat, RgbImage, RgbaImage};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::error::{ExtractError, Result};
use crate::utils::blend_over;

/// Output encodings offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Gif,
    #[serde(alias = "jpeg")]
    Jpg,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Gif, ExportFormat::Jpg];

    /// File extension (lowercase tag)
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Jpg => "jpg",
        }
    }

    /// Text shown in format choices
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Jpg => "JPG (Not Recommended)",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Png => "PNG",
            Self::Gif => "GIF",
            Self::Jpg => "JPG",
        };
        f.write_str(tag)
    }
}

impl FromStr for ExportFormat {
    type Err = ExtractError;

    /// Only the first word counts: "JPG (Not Recommended)" is JPG
    fn from_str(s: &str) -> Result<Self> {
        let word = s.split_whitespace().next().unwrap_or("");
        match word.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => {
                let expected: Vec<String> = Self::ALL.iter().map(|f| f.to_string()).collect();
                Err(ExtractError::Validation(format!(
                    "Unknown image format '{}' (expected {}).",
                    s.trim(),
                    expected.join(", ")
                )))
            }
        }
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub jpeg_quality: u8,
    /// RGB that transparent pixels are blended onto for JPG
    pub jpeg_background: (u8, u8, u8),
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            jpeg_background: (255, 255, 255),
        }
    }
}

/// Suggested file name: "U+1F600", 128, PNG -> "U1F600_128.png"
pub fn default_file_name(label: &str, size: u32, format: ExportFormat) -> String {
    format!("{}_{}.{}", label.replace('+', ""), size, format.extension())
}

/// Encode `image` into `path`. A partially written file is removed on failure.
pub fn save_image(
    image: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    info!(
        "Export: {}x{} {} -> {}",
        image.width(),
        image.height(),
        format,
        path.display()
    );

    let file = File::create(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let result = write_encoded(image, file, format, options, path);
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(path) {
            debug!("Export: could not remove partial file {}: {}", path.display(), e);
        }
    }
    result
}

fn write_encoded(
    image: &RgbaImage,
    file: File,
    format: ExportFormat,
    options: &ExportOptions,
    path: &Path,
) -> Result<()> {
    let mut writer = BufWriter::new(file);

    let encoded = match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut writer, ImageOutputFormat::Png)
        }
        ExportFormat::Gif => {
            DynamicImage::ImageRgba8(image.clone()).write_to(&mut writer, ImageOutputFormat::Gif)
        }
        ExportFormat::Jpg => {
            if has_transparency(image) {
                warn!(
                    "Export: JPG has no alpha channel, transparent pixels flattened onto #{:02x}{:02x}{:02x}",
                    options.jpeg_background.0, options.jpeg_background.1, options.jpeg_background.2
                );
            }
            DynamicImage::ImageRgb8(flatten(image, options.jpeg_background))
                .write_to(&mut writer, ImageOutputFormat::Jpeg(options.jpeg_quality))
        }
    };
    encoded.map_err(|e| encode_error(e, format, path))?;

    writer.flush().map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_error(err: ImageError, format: ExportFormat, path: &Path) -> ExtractError {
    match err {
        ImageError::IoError(source) => ExtractError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => ExtractError::ImageEncode { format, source },
    }
}

fn has_transparency(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p.0[3] < 255)
}

/// Blend every pixel over an opaque background
fn flatten(image: &RgbaImage, background: (u8, u8, u8)) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        image::Rgb(blend_over(image.get_pixel(x, y).0, background))
    })
}
