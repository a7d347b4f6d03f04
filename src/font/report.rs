//! Font summary for the `info` command

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ExtractError, Result};
use crate::font::cmap::{Cmap, EncodingRecord};
use crate::font::color_tables::ColorGlyphIndex;
use crate::font::glyphs;
use crate::font::loader::EmojiCatalog;
use crate::font::sfnt::{tag_name, ColorTables, FontFile};

/// What a font contains, as far as emoji extraction is concerned
#[derive(Debug, Clone)]
pub struct FontReport {
    pub path: PathBuf,
    pub sfnt_version: u32,
    /// (tag, length) per table, in tag order
    pub tables: Vec<(String, usize)>,
    pub num_glyphs: Option<u16>,
    pub cmap_records: Vec<EncodingRecord>,
    pub color_tables: ColorTables,
    pub color_glyphs: usize,
    /// None when the font has no suitable Unicode cmap
    pub emoji_count: Option<usize>,
}

impl FontReport {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| ExtractError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, &data)
    }

    pub fn from_bytes<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<Self> {
        let font = FontFile::parse(data)?;
        let face = glyphs::open_face(data);
        let colors = ColorGlyphIndex::build(&font, face.as_ref());

        let cmap_records = match font.table(b"cmap") {
            Some(table) => Cmap::parse(table)?.records().to_vec(),
            None => Vec::new(),
        };

        let emoji_count = if cmap_records.is_empty() {
            None
        } else {
            match EmojiCatalog::from_bytes(path.as_ref(), data) {
                Ok(catalog) => Some(catalog.len()),
                Err(ExtractError::NoUnicodeCmap) => None,
                Err(e) => return Err(e),
            }
        };

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            sfnt_version: font.sfnt_version(),
            tables: font
                .tables()
                .map(|(tag, record)| (tag_name(tag), record.length))
                .collect(),
            num_glyphs: font.num_glyphs().ok(),
            cmap_records,
            color_tables: colors.tables(),
            color_glyphs: colors.len(),
            emoji_count,
        })
    }
}

impl fmt::Display for FontReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Font:         {}", self.path.display())?;
        writeln!(f, "sfnt version: 0x{:08X}", self.sfnt_version)?;
        match self.num_glyphs {
            Some(n) => writeln!(f, "Glyphs:       {}", n)?,
            None => writeln!(f, "Glyphs:       unknown (no maxp)")?,
        }
        writeln!(
            f,
            "Color:        {} ({} color glyphs)",
            self.color_tables.describe(),
            self.color_glyphs
        )?;
        match self.emoji_count {
            Some(n) => writeln!(f, "Emoji:        {}", n)?,
            None => writeln!(f, "Emoji:        no Unicode cmap")?,
        }

        writeln!(f, "cmap subtables:")?;
        for record in &self.cmap_records {
            writeln!(
                f,
                "  platform {} encoding {:<2} format {:<2}{}",
                record.platform_id,
                record.encoding_id,
                record.format,
                if record.is_unicode() { "  unicode" } else { "" }
            )?;
        }

        writeln!(f, "Tables:")?;
        for (tag, length) in &self.tables {
            writeln!(f, "  {:<4}  {:>10} bytes", tag, length)?;
        }
        Ok(())
    }
}
