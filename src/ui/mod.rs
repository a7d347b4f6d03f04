//! User actions
//!
//! [`Controller`] owns the loaded [`EmojiCatalog`] and the form state
//! (font path, selection, size field, format) and runs the three actions:
//! browse for a font, select an emoji, extract it. Errors are caught at the
//! end of each action and surfaced through a [`Notifier`].

pub mod shell;
pub mod window;

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::Config;
use crate::constants::DEFAULT_EXPORT_SIZE;
use crate::error::{ExtractError, Result};
use crate::export::{self, ExportFormat};
use crate::font::{parse_label, EmojiCatalog, EmojiEntry};
use crate::render;

/// Receives (title, message) notices
pub trait Notifier {
    fn error(&mut self, title: &str, message: &str);
    fn info(&mut self, title: &str, message: &str);
}

/// Asks where to save an export. None means the user cancelled.
pub trait SavePrompt {
    fn ask_save_path(&mut self, default_name: &str, format: ExportFormat) -> Option<PathBuf>;
}

/// Validated parameters of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRequest {
    pub font_path: PathBuf,
    pub label: String,
    pub codepoint: u32,
    pub size: u32,
    pub format: ExportFormat,
}

impl ExtractRequest {
    pub fn default_file_name(&self) -> String {
        export::default_file_name(&self.label, self.size, self.format)
    }
}

/// Size field text -> pixels. Anything but a positive decimal number
/// gives the default, surrounding whitespace included.
pub fn parse_size_field(text: &str) -> u32 {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_EXPORT_SIZE;
    }
    match text.parse::<u32>() {
        Ok(0) => DEFAULT_EXPORT_SIZE,
        Ok(size) => size,
        // All digits but too long for u32
        Err(_) => u32::MAX,
    }
}

/// Append the format's extension when `path` has none
pub fn with_default_extension(mut path: PathBuf, format: ExportFormat) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension(format.extension());
    }
    path
}

pub struct Controller<N: Notifier> {
    notifier: N,
    config: Config,
    font_path: Option<PathBuf>,
    catalog: Option<EmojiCatalog>,
    selected: Option<String>,
    size_field: String,
    format: ExportFormat,
}

impl<N: Notifier> Controller<N> {
    pub fn new(config: Config, notifier: N) -> Self {
        let size_field = config.export.size.to_string();
        let format = config.export.format;
        Self {
            notifier,
            config,
            font_path: None,
            catalog: None,
            selected: None,
            size_field,
            format,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[cfg(test)]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }

    pub fn catalog(&self) -> Option<&EmojiCatalog> {
        self.catalog.as_ref()
    }

    /// Labels of the loaded font, empty when nothing is loaded
    pub fn labels(&self) -> Vec<&str> {
        self.catalog
            .as_ref()
            .map(|c| c.labels().collect())
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn size_field(&self) -> &str {
        &self.size_field
    }

    pub fn set_size_field(&mut self, text: &str) {
        self.size_field = text.to_string();
    }

    /// Size field text for in-place editing
    pub fn size_field_mut(&mut self) -> &mut String {
        &mut self.size_field
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn set_format(&mut self, format: ExportFormat) {
        self.format = format;
    }

    /// Browse action. An empty path is a cancelled dialog and changes
    /// nothing. Returns whether a font was loaded.
    pub fn browse_font(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() {
            debug!("Browse: cancelled");
            return false;
        }
        match self.try_browse_font(Path::new(path)) {
            Ok(_) => true,
            Err(e) => {
                self.notifier.error(e.notice_title(), &e.to_string());
                false
            }
        }
    }

    /// Load `path` as the current font, returning the number of emoji.
    /// After a load error the list and mapping are left empty.
    pub fn try_browse_font(&mut self, path: &Path) -> Result<usize> {
        self.font_path = Some(path.to_path_buf());

        match EmojiCatalog::load(path) {
            Ok(catalog) => {
                let count = catalog.len();
                info!("Browse: {} emoji in {}", count, path.display());
                self.selected = None;
                self.catalog = Some(catalog);
                Ok(count)
            }
            Err(e) => {
                if e.is_load_error() {
                    self.selected = None;
                    self.catalog = None;
                }
                Err(e)
            }
        }
    }

    /// Select an emoji by its display label
    pub fn select(&mut self, label: &str) -> Result<&EmojiEntry> {
        let catalog = self
            .catalog
            .as_ref()
            .ok_or_else(|| ExtractError::Validation("No font loaded.".to_string()))?;
        let entry = catalog
            .entry(label)
            .ok_or_else(|| ExtractError::Validation(format!("'{}' is not in the list.", label)))?;
        self.selected = Some(entry.label.clone());
        Ok(entry)
    }

    /// Turn user input into a label of the current list: a label
    /// ("U+1F600"), a 1-based list position ("#3") or a bare hex codepoint
    pub fn resolve_selection(&self, input: &str) -> Option<String> {
        let catalog = self.catalog.as_ref()?;
        let input = input.trim();
        if let Some(index) = input.strip_prefix('#') {
            let n: usize = index.parse().ok()?;
            return catalog.entries().get(n.checked_sub(1)?).map(|e| e.label.clone());
        }
        let codepoint = parse_label(input)?;
        catalog
            .entries()
            .binary_search_by_key(&codepoint, |e| e.codepoint)
            .ok()
            .map(|i| catalog.entries()[i].label.clone())
    }

    /// Validate the form for an export. Touches no files.
    pub fn extract_request(&self) -> Result<ExtractRequest> {
        let font_path = self
            .font_path
            .clone()
            .ok_or_else(|| ExtractError::Validation("Please select an emoji font file.".to_string()))?;
        let label = self
            .selected
            .clone()
            .ok_or_else(|| ExtractError::Validation("Please select an emoji.".to_string()))?;
        let codepoint = self
            .catalog
            .as_ref()
            .and_then(|c| c.codepoint(&label))
            .ok_or_else(|| ExtractError::Validation(format!("Unicode for '{}' not found.", label)))?;

        let size = parse_size_field(&self.size_field);
        let max_size = self.config.export.max_size;
        if size > max_size {
            return Err(ExtractError::Validation(format!(
                "Size {} is larger than the maximum of {} pixels.",
                size, max_size
            )));
        }

        Ok(ExtractRequest {
            font_path,
            label,
            codepoint,
            size,
            format: self.format,
        })
    }

    /// Extract action: errors become notices. Returns the saved path.
    pub fn extract(&mut self, prompt: &mut dyn SavePrompt) -> Option<PathBuf> {
        match self.try_extract(prompt) {
            Ok(saved) => saved,
            Err(e) => {
                self.notifier.error(e.notice_title(), &e.to_string());
                None
            }
        }
    }

    /// Validate, ask for a destination, render and save.
    /// Ok(None) when the save prompt was cancelled.
    pub fn try_extract(&mut self, prompt: &mut dyn SavePrompt) -> Result<Option<PathBuf>> {
        let request = self.extract_request()?;
        let Some(path) = prompt.ask_save_path(&request.default_file_name(), request.format) else {
            debug!("Extract: save cancelled");
            return Ok(None);
        };

        let options = self.config.render.options(request.size);
        let rendered = render::render_glyph_to_image(&request.font_path, request.codepoint, &options)?;
        export::save_image(
            &rendered.image,
            &path,
            request.format,
            &self.config.export.options(),
        )?;
        info!(
            "Extract: {} (glyph '{}') saved to {}",
            request.label,
            rendered.glyph_name,
            path.display()
        );

        self.notifier
            .info("Success", &format!("Emoji saved to '{}'", path.display()));
        Ok(Some(path))
    }
}
