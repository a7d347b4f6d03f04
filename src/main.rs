//! emoji-extract - list and export the emoji of a TrueType/OpenType font
//!
//! Reads a font's Unicode cmap, lists the codepoints in the emoji ranges and
//! exports a selected glyph as PNG, GIF or JPG. Runs as a desktop window by
//! default, with a terminal session and one-shot subcommands besides.

mod config;
mod constants;
mod error;
mod export;
mod font;
mod render;
mod ui;
mod utils;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use crate::error::ExtractError;
use crate::font::{EmojiCatalog, FontReport};
use crate::ui::shell::{PresetSavePath, Shell};
use crate::ui::window::{self, DialogNotifier};
use crate::ui::{Controller, Notifier};

/// emoji-extract CLI arguments
///
/// Examples:
///   emoji-extract                                   # Desktop window
///   emoji-extract NotoColorEmoji.ttf                # Window with a font loaded
///   emoji-extract shell NotoColorEmoji.ttf          # Terminal session
///   emoji-extract list NotoColorEmoji.ttf           # Print the emoji list
///   emoji-extract extract font.ttf U+1F600 -s 256   # Export one emoji
///   emoji-extract --init-config                     # Write the default config
#[derive(Parser, Debug)]
#[clap(
    name = "emoji-extract",
    version,
    about = "List the emoji of a TrueType/OpenType font and export them as images",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Font to load when the window opens
    font: Option<PathBuf>,

    /// Generate the config file
    #[clap(long = "init-config", help = "Write the default config file and exit")]
    init_config: bool,

    /// Overwrite config file without confirmation
    #[clap(long, short = 'f', requires = "init_config")]
    force: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal session
    Shell {
        /// Font to load on start
        font: Option<PathBuf>,
    },
    /// Print the emoji of a font: label, glyph name, color format
    List { font: PathBuf },
    /// Print font tables, cmap subtables and color formats
    Info { font: PathBuf },
    /// Export one emoji
    Extract {
        font: PathBuf,
        /// Label (U+1F600), list position (#3) or hex codepoint
        emoji: String,
        /// Size in pixels (non-numbers mean 128)
        #[clap(long, short = 's')]
        size: Option<String>,
        /// png, gif or jpg
        #[clap(long = "format", short = 'F')]
        format: Option<String>,
        /// Output file (default: U<hex>_<size>.<format> in the current directory)
        #[clap(long, short = 'o')]
        output: Option<String>,
    },
}

/// Prints notices to the terminal
#[derive(Default)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn error(&mut self, title: &str, message: &str) {
        eprintln!("[{}] {}", title, message);
    }

    fn info(&mut self, title: &str, message: &str) {
        println!("[{}] {}", title, message);
    }
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.init_config {
        return init_config(cli.force);
    }

    let cfg = config::Config::load();
    info!("emoji-extract starting...");

    let outcome = match cli.command {
        None => return run_window(cfg, cli.font),
        Some(Command::Shell { font }) => return run_shell(cfg, font),
        Some(Command::List { font }) => list(&font),
        Some(Command::Info { font }) => FontReport::load(&font).map(|report| print!("{}", report)),
        Some(Command::Extract {
            font,
            emoji,
            size,
            format,
            output,
        }) => extract(cfg, font, &emoji, size, format, output),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            ConsoleNotifier.error(e.notice_title(), &e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_config(force: bool) -> Result<ExitCode> {
    let path = config::default_config_path().context("Cannot determine config directory")?;

    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        print!("Overwrite? [y/N]: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim().to_lowercase();

        if input != "y" && input != "yes" {
            println!("Aborted.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    match config::Config::write_default_config(&path) {
        Ok(()) => {
            println!("Config file generated:");
            println!("  Path: {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Failed to generate config: {:#}", e);
            Err(e)
        }
    }
}

fn run_window(cfg: config::Config, font: Option<PathBuf>) -> Result<ExitCode> {
    window::run(Controller::new(cfg, DialogNotifier), font)?;
    Ok(ExitCode::SUCCESS)
}

fn run_shell(cfg: config::Config, font: Option<PathBuf>) -> Result<ExitCode> {
    let mut controller = Controller::new(cfg, ConsoleNotifier);
    if let Some(font) = font {
        let path = font.to_string_lossy().into_owned();
        if controller.browse_font(&path) {
            println!("Loaded {} emoji from {}", controller.labels().len(), path);
        }
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock(), controller);
    shell.run().context("Terminal I/O failed")?;
    Ok(ExitCode::SUCCESS)
}

fn list(font: &std::path::Path) -> error::Result<()> {
    let catalog = EmojiCatalog::load(font)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for entry in catalog.entries() {
        // A closed pipe (e.g. `| head`) ends the listing
        if writeln!(
            out,
            "{:<9} {:<24} {}",
            entry.label,
            entry.glyph_name,
            entry.color.map_or("-", |c| c.tag())
        )
        .is_err()
        {
            break;
        }
    }
    Ok(())
}

fn extract(
    cfg: config::Config,
    font: PathBuf,
    emoji: &str,
    size: Option<String>,
    format: Option<String>,
    output: Option<String>,
) -> error::Result<()> {
    let mut controller = Controller::new(cfg, ConsoleNotifier);
    controller.try_browse_font(&font)?;

    let label = controller
        .resolve_selection(emoji)
        .ok_or_else(|| ExtractError::Validation(format!("'{}' is not in the list.", emoji)))?;
    controller.select(&label)?;
    if let Some(size) = size {
        controller.set_size_field(&size);
    }
    if let Some(format) = format {
        controller.set_format(format.parse()?);
    }

    let mut prompt = PresetSavePath {
        answer: output,
        dir: PathBuf::from("."),
    };
    controller.try_extract(&mut prompt)?;
    Ok(())
}
