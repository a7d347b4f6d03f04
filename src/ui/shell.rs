//! Interactive terminal session
//!
//! Line-oriented front end for [`Controller`]: one command per line, each
//! run to completion before the next is read.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use log::debug;

use super::{parse_size_field, with_default_extension, Controller, Notifier, SavePrompt};
use crate::export::ExportFormat;
use crate::font::discovery::find_emoji_font;
use crate::font::FontReport;
use crate::utils::expand_path;

const HELP: &str = "\
Commands:
    open [PATH]        Load a font (configured or system emoji font if omitted)
    list [FILTER]      List emoji, optionally filtered by label or glyph name
    select <EMOJI>     Select by label (U+1F600), list position (#3) or hex
    size <N>           Output size in pixels (non-numbers mean 128)
    format <F>         Output format: png, gif or jpg
    extract [PATH]     Render the selected emoji and save it
    info               Show font tables and color formats
    status             Show current font, selection, size and format
    help               Show this help
    quit               Leave";

/// Where an answer to the save prompt lands: `~` expanded, the format's
/// extension added when missing, relative paths placed under `dir`
pub fn resolve_save_path(answer: &str, format: ExportFormat, dir: &Path) -> PathBuf {
    let path = with_default_extension(PathBuf::from(expand_path(answer.trim(), None)), format);
    if path.is_relative() {
        dir.join(path)
    } else {
        path
    }
}

/// Save prompt with a preset answer (or the default name), no questions asked
pub struct PresetSavePath {
    pub answer: Option<String>,
    pub dir: PathBuf,
}

impl SavePrompt for PresetSavePath {
    fn ask_save_path(&mut self, default_name: &str, format: ExportFormat) -> Option<PathBuf> {
        let answer = self.answer.as_deref().unwrap_or(default_name);
        Some(resolve_save_path(answer, format, &self.dir))
    }
}

/// Save prompt that asks on the terminal. Empty input takes the default
/// name; "-", end of input or a failed prompt write cancels.
struct LinePrompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
    dir: &'a Path,
}

impl<R: BufRead, W: Write> SavePrompt for LinePrompt<'_, R, W> {
    fn ask_save_path(&mut self, default_name: &str, format: ExportFormat) -> Option<PathBuf> {
        let asked = write!(
            self.output,
            "Save as [{}] ('-' cancels): ",
            self.dir.join(default_name).display()
        )
        .and_then(|()| self.output.flush());
        if let Err(e) = asked {
            debug!("Shell: save prompt not shown: {}", e);
            return None;
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => match line.trim() {
                "-" => None,
                "" => Some(resolve_save_path(default_name, format, self.dir)),
                answer => Some(resolve_save_path(answer, format, self.dir)),
            },
        }
    }
}

pub struct Shell<R, W, N: Notifier> {
    input: R,
    output: W,
    controller: Controller<N>,
}

impl<R: BufRead, W: Write, N: Notifier> Shell<R, W, N> {
    pub fn new(input: R, output: W, controller: Controller<N>) -> Self {
        Self {
            input,
            output,
            controller,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &Controller<N> {
        &self.controller
    }

    /// Read and run commands until `quit` or end of input
    pub fn run(&mut self) -> std::io::Result<()> {
        writeln!(self.output, "emoji-extract {}. Type 'help' for commands.", env!("CARGO_PKG_VERSION"))?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                return Ok(());
            }
            if !self.execute(line.trim())? {
                return Ok(());
            }
        }
    }

    /// Run one command line. Returns false when the session should end.
    pub fn execute(&mut self, line: &str) -> std::io::Result<bool> {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, rest)) => (c, rest.trim()),
            None => (line, ""),
        };
        debug!("Shell: command '{}' arg '{}'", command, arg);

        match command {
            "" => {}
            "open" | "o" => self.open(arg)?,
            "list" | "ls" => self.list(arg)?,
            "select" | "s" => self.select(arg)?,
            "size" => {
                self.controller.set_size_field(arg);
                writeln!(self.output, "Size: {}", parse_size_field(arg))?;
            }
            "format" | "f" => match arg.parse::<ExportFormat>() {
                Ok(format) => {
                    self.controller.set_format(format);
                    writeln!(self.output, "Format: {}", format.display_name())?;
                }
                Err(e) => writeln!(self.output, "{}", e)?,
            },
            "extract" | "x" => self.extract(arg)?,
            "info" => self.info()?,
            "status" => self.status()?,
            "help" | "?" => writeln!(self.output, "{}", HELP)?,
            "quit" | "exit" | "q" => return Ok(false),
            other => writeln!(self.output, "Unknown command '{}'. Type 'help'.", other)?,
        }
        Ok(true)
    }

    fn open(&mut self, arg: &str) -> std::io::Result<()> {
        let path = if arg.is_empty() {
            match find_emoji_font(&self.controller.config().font.path) {
                Some(path) => path.to_string_lossy().into_owned(),
                None => {
                    writeln!(self.output, "No emoji font found. Use: open PATH")?;
                    return Ok(());
                }
            }
        } else {
            expand_path(arg, None)
        };

        if !self.controller.browse_font(&path) {
            return Ok(());
        }
        if let Some(catalog) = self.controller.catalog() {
            writeln!(
                self.output,
                "Loaded {} emoji from {}",
                catalog.len(),
                catalog.path().display()
            )?;
            if catalog.is_empty() && catalog.subtable().format == 4 {
                writeln!(
                    self.output,
                    "The font maps only the Basic Multilingual Plane (cmap format 4)."
                )?;
            }
        }
        Ok(())
    }

    fn list(&mut self, filter: &str) -> std::io::Result<()> {
        let Some(catalog) = self.controller.catalog() else {
            writeln!(self.output, "No font loaded.")?;
            return Ok(());
        };
        let filter = filter.to_lowercase();
        let selected = self.controller.selected();

        let mut shown = 0;
        for (i, entry) in catalog.entries().iter().enumerate() {
            if !filter.is_empty()
                && !entry.label.to_lowercase().contains(&filter)
                && !entry.glyph_name.to_lowercase().contains(&filter)
            {
                continue;
            }
            let mark = if selected == Some(entry.label.as_str()) { '*' } else { ' ' };
            writeln!(
                self.output,
                "{}{:>5}  {:<9} {:>5}  {:<24} {}",
                mark,
                i + 1,
                entry.label,
                entry.glyph_id,
                entry.glyph_name,
                entry.color.map_or("-", |c| c.tag())
            )?;
            shown += 1;
        }
        writeln!(self.output, "{} of {} emoji", shown, catalog.len())
    }

    fn select(&mut self, arg: &str) -> std::io::Result<()> {
        if arg.is_empty() {
            return writeln!(self.output, "Usage: select <U+XXXX | #N | HEX>");
        }
        let Some(label) = self.controller.resolve_selection(arg) else {
            return writeln!(self.output, "'{}' is not in the list.", arg);
        };
        match self.controller.select(&label) {
            Ok(entry) => {
                let line = format!("Selected {} ({})", entry.label, entry.glyph_name);
                writeln!(self.output, "{}", line)
            }
            Err(e) => writeln!(self.output, "{}", e),
        }
    }

    fn extract(&mut self, arg: &str) -> std::io::Result<()> {
        let dir = self.controller.config().export.output_dir();
        if arg.is_empty() {
            let mut prompt = LinePrompt {
                input: &mut self.input,
                output: &mut self.output,
                dir: &dir,
            };
            self.controller.extract(&mut prompt);
            // Prompt output has no trailing newline when cancelled by EOF
            writeln!(self.output)?;
        } else {
            let mut prompt = PresetSavePath {
                answer: Some(arg.to_string()),
                dir,
            };
            self.controller.extract(&mut prompt);
        }
        Ok(())
    }

    fn info(&mut self) -> std::io::Result<()> {
        let Some(path) = self.controller.font_path() else {
            return writeln!(self.output, "No font loaded.");
        };
        match FontReport::load(path) {
            Ok(report) => write!(self.output, "{}", report),
            Err(e) => writeln!(self.output, "{}", e),
        }
    }

    fn status(&mut self) -> std::io::Result<()> {
        let ctl = &self.controller;
        let font = ctl
            .font_path()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
        writeln!(self.output, "Font:     {}", font)?;
        match ctl.catalog() {
            Some(catalog) => {
                let record = catalog.subtable();
                writeln!(
                    self.output,
                    "Emoji:    {} (cmap {}/{} format {})",
                    catalog.len(),
                    record.platform_id,
                    record.encoding_id,
                    record.format
                )?;
            }
            None => writeln!(self.output, "Emoji:    0")?,
        }
        writeln!(self.output, "Selected: {}", ctl.selected().unwrap_or("(none)"))?;
        writeln!(self.output, "Size:     {}", parse_size_field(ctl.size_field()))?;
        writeln!(self.output, "Format:   {}", ctl.format().display_name())?;
        writeln!(
            self.output,
            "Output:   {}",
            ctl.config().export.output_dir().display()
        )
    }
}
