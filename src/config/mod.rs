//! Configuration file management
//!
//! Loads TOML configuration files and provides application settings.
//! Default config path: ~/.config/emoji-extract/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_EXPORT_SIZE, DEFAULT_JPEG_QUALITY, DEFAULT_MAX_EXPORT_SIZE};
use crate::export::{ExportFormat, ExportOptions};
use crate::render::RenderOptions;
use crate::utils::{expand_path, parse_hex_color};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Font settings
    pub font: FontConfig,
    /// Export settings
    pub export: ExportConfig,
    /// Rendering settings
    pub render: RenderConfig,
}

/// Font settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font opened by `open` without a path (searches system fonts if empty)
    pub path: String,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Initial value of the size field (pixels)
    pub size: u32,
    /// Initial output format: "png" | "gif" | "jpg"
    pub format: ExportFormat,
    /// Directory for relative output names ("~" is expanded)
    pub output_dir: String,
    /// Largest accepted export size (pixels)
    pub max_size: u32,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Background (RRGGBB) that transparent pixels are flattened onto for JPEG
    pub jpeg_background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_EXPORT_SIZE,
            format: ExportFormat::Png,
            output_dir: "~".to_string(),
            max_size: DEFAULT_MAX_EXPORT_SIZE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            jpeg_background: "ffffff".to_string(),
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Rasterize glyph outlines as monochrome silhouettes.
    /// When false, every render request reports that glyph rendering
    /// is not supported (color formats are never rasterized).
    pub outline_fallback: bool,
    /// Outline fill color (RRGGBB)
    pub outline_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            outline_fallback: false,
            outline_color: "000000".to_string(),
        }
    }
}

impl ExportConfig {
    /// Output directory with ~ expanded
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.output_dir, None))
    }

    /// Encoder options derived from these settings
    pub fn options(&self) -> ExportOptions {
        let background = parse_hex_color(&self.jpeg_background).unwrap_or_else(|| {
            warn!(
                "Invalid jpeg_background '{}', using white",
                self.jpeg_background
            );
            (255, 255, 255)
        });
        ExportOptions {
            jpeg_quality: self.jpeg_quality.clamp(1, 100),
            jpeg_background: background,
        }
    }
}

impl RenderConfig {
    /// Renderer options for one export size
    pub fn options(&self, size: u32) -> RenderOptions {
        let color = parse_hex_color(&self.outline_color).unwrap_or_else(|| {
            warn!("Invalid outline_color '{}', using black", self.outline_color);
            (0, 0, 0)
        });
        RenderOptions {
            size,
            outline_fallback: self.outline_fallback,
            outline_color: color,
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/emoji-extract/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. EMOJI_EXTRACT_CONFIG environment variable
        if let Ok(path) = std::env::var("EMOJI_EXTRACT_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("EMOJI_EXTRACT_CONFIG points to a missing file: {}", path);
        }

        // 2. User config: ~/.config/emoji-extract/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/emoji-extract/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. EMOJI_EXTRACT_CONFIG environment variable
    /// 2. ~/.config/emoji-extract/config.toml (user config)
    /// 3. /etc/emoji-extract/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the default configuration to `path`, creating parent directories
    pub fn write_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = toml::to_string_pretty(&Config::default())
            .context("Failed to serialize default config")?;
        let content = format!(
            "# emoji-extract configuration\n\
             # render.outline_fallback = true draws glyph outlines in one color;\n\
             # color glyph formats (CBDT, COLR, sbix, SVG) are never rasterized.\n\n{}",
            body
        );
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!("Wrote default config: {}", path.display());
        Ok(())
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("emoji-extract").join("config.toml"))
}
