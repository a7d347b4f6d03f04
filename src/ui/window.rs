//! Desktop window
//!
//! A single eframe window holding the extractor form: font path with
//! Browse, the emoji list, size and format fields and the Extract button.
//! File pickers and notices are native rfd dialogs.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use eframe::egui;
use log::{debug, info, warn};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use super::{with_default_extension, Controller, Notifier, SavePrompt};
use crate::export::ExportFormat;

pub const WINDOW_TITLE: &str = "Emoji Extractor";

/// Height of the emoji list in points
const LIST_HEIGHT: f32 = 240.0;

/// Shows notices as native message boxes
#[derive(Default)]
pub struct DialogNotifier;

impl DialogNotifier {
    fn show(level: MessageLevel, title: &str, message: &str) {
        let result = MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
        debug!("Notice '{}' closed: {:?}", title, result);
    }
}

impl Notifier for DialogNotifier {
    fn error(&mut self, title: &str, message: &str) {
        Self::show(MessageLevel::Error, title, message);
    }

    fn info(&mut self, title: &str, message: &str) {
        Self::show(MessageLevel::Info, title, message);
    }
}

/// Native "Save Emoji As" dialog starting in `dir`
pub struct SaveDialog {
    dir: PathBuf,
}

impl SaveDialog {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl SavePrompt for SaveDialog {
    fn ask_save_path(&mut self, default_name: &str, format: ExportFormat) -> Option<PathBuf> {
        let mut dialog = FileDialog::new()
            .set_title("Save Emoji As")
            .set_file_name(default_name)
            .add_filter(format.to_string(), &[format.extension()]);
        if self.dir.is_dir() {
            dialog = dialog.set_directory(&self.dir);
        }
        dialog
            .save_file()
            .map(|path| with_default_extension(path, format))
    }
}

fn pick_font_file() -> Option<PathBuf> {
    FileDialog::new()
        .set_title("Select Emoji Font File")
        .add_filter("Font files", &["ttf", "otf", "ttc"])
        .add_filter("All files", &["*"])
        .pick_file()
}

pub struct EmojiWindow<N: Notifier> {
    controller: Controller<N>,
    /// Font path as typed or picked
    font_entry: String,
}

impl<N: Notifier> EmojiWindow<N> {
    pub fn new(controller: Controller<N>) -> Self {
        let font_entry = controller
            .font_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        Self {
            controller,
            font_entry,
        }
    }

    #[cfg(test)]
    pub fn controller(&self) -> &Controller<N> {
        &self.controller
    }

    pub fn font_entry(&self) -> &str {
        &self.font_entry
    }

    /// Result of the font picker. None is a cancelled dialog and keeps the
    /// current entry and list.
    pub fn browse_picked(&mut self, picked: Option<PathBuf>) {
        let Some(path) = picked else {
            debug!("Window: font dialog cancelled");
            return;
        };
        self.font_entry = path.display().to_string();
        self.load_entry();
    }

    /// Load whatever the font entry holds
    pub fn load_entry(&mut self) {
        let path = self.font_entry.clone();
        if self.controller.browse_font(&path) {
            info!("Window: {} emoji listed", self.controller.labels().len());
        }
    }

    pub fn select_label(&mut self, label: &str) {
        match self.controller.select(label) {
            Ok(entry) => debug!("Window: selected {} ({})", entry.label, entry.glyph_name),
            Err(e) => warn!("Window: {}", e),
        }
    }

    pub fn extract_to(&mut self, prompt: &mut dyn SavePrompt) -> Option<PathBuf> {
        self.controller.extract(prompt)
    }

    fn font_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Emoji Font:");
            let entry = ui.add(
                egui::TextEdit::singleline(&mut self.font_entry)
                    .hint_text("TrueType / OpenType font")
                    .desired_width(340.0),
            );
            if entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.load_entry();
            }
            if ui.button("Browse").clicked() {
                self.browse_picked(pick_font_file());
            }
        });
    }

    fn emoji_list(&mut self, ui: &mut egui::Ui) {
        ui.label("Select Emoji:");
        let row_height = ui.text_style_height(&egui::TextStyle::Body);
        let mut clicked = None;

        egui::Frame::group(ui.style()).show(ui, |ui| {
            let Some(catalog) = self.controller.catalog() else {
                ui.set_min_height(LIST_HEIGHT);
                ui.label("No font loaded.");
                return;
            };
            let selected = self.controller.selected();
            egui::ScrollArea::vertical()
                .max_height(LIST_HEIGHT)
                .auto_shrink([false, false])
                .show_rows(ui, row_height, catalog.len(), |ui, rows| {
                    for entry in &catalog.entries()[rows] {
                        let text = format!("{}    {}", entry.label, entry.glyph_name);
                        let is_selected = selected == Some(entry.label.as_str());
                        if ui.selectable_label(is_selected, text).clicked() {
                            clicked = Some(entry.label.clone());
                        }
                    }
                });
        });

        if let Some(label) = clicked {
            self.select_label(&label);
        }
    }

    fn options_rows(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Size:");
            ui.add(egui::TextEdit::singleline(self.controller.size_field_mut()).desired_width(60.0));
            ui.label("pixels");
        });

        ui.horizontal(|ui| {
            ui.label("Format:");
            let mut format = self.controller.format();
            egui::ComboBox::from_id_source("export_format")
                .selected_text(format.display_name())
                .width(200.0)
                .show_ui(ui, |ui| {
                    for choice in ExportFormat::ALL {
                        ui.selectable_value(&mut format, choice, choice.display_name());
                    }
                });
            if format != self.controller.format() {
                self.controller.set_format(format);
            }
        });
    }

    fn status_line(&self, ui: &mut egui::Ui) {
        let text = match self.controller.catalog() {
            Some(catalog) => format!("{} emoji in {}", catalog.len(), file_name(catalog.path())),
            None => "No font loaded".to_string(),
        };
        ui.weak(text);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<N: Notifier> eframe::App for EmojiWindow<N> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;
            self.font_row(ui);
            self.emoji_list(ui);
            self.options_rows(ui);

            ui.vertical_centered(|ui| {
                if ui.button("Extract Emoji").clicked() {
                    let mut dialog = SaveDialog::new(self.controller.config().export.output_dir());
                    self.extract_to(&mut dialog);
                }
            });
            ui.separator();
            self.status_line(ui);
        });
    }
}

/// Open the window, optionally with a font already loaded, and block until it closes
pub fn run(controller: Controller<DialogNotifier>, font: Option<PathBuf>) -> anyhow::Result<()> {
    let mut window = EmojiWindow::new(controller);
    window.browse_picked(font);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([560.0, 520.0])
            .with_min_inner_size([440.0, 420.0]),
        ..Default::default()
    };
    info!("Window: opening");
    eframe::run_native(WINDOW_TITLE, options, Box::new(move |_cc| Box::new(window)))
        .map_err(|e| anyhow!("Window failed: {}", e))
}
