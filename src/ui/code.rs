use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::syntax_highlighting::{self, CodeTheme};

use crate::clipboard::ClipboardSink;
use crate::data::classify::language_hint;
use crate::data::model::GeneratedFileSet;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Selection rules
// ---------------------------------------------------------------------------

/// What the content pane should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// The file set has no files.
    Empty,
    File { name: &'a str, content: &'a str },
    /// The selected name is not in the current file set.
    Missing,
}

/// Select the first file when nothing is selected yet.
pub fn ensure_default_selection(files: &GeneratedFileSet, selected: &mut Option<String>) {
    if selected.is_none() {
        *selected = files.first_name().map(str::to_owned);
    }
}

pub fn resolve_selection<'a>(files: &'a GeneratedFileSet, selected: Option<&str>) -> Selection<'a> {
    if files.is_empty() {
        return Selection::Empty;
    }
    selected
        .and_then(|name| files.iter().find(|(n, _)| *n == name))
        .map(|(name, content)| Selection::File { name, content })
        .unwrap_or(Selection::Missing)
}

fn copy_key(file_name: &str) -> String {
    format!("file:{file_name}")
}

enum InspectorAction {
    Select(String),
    Copy { key: String, text: String },
}

// ---------------------------------------------------------------------------
// Code tab
// ---------------------------------------------------------------------------

/// Render the file tab strip and the selected file's content.
pub fn code_inspector(ui: &mut Ui, state: &mut AppState, clipboard: &mut dyn ClipboardSink) {
    panels::loading_indicator(ui, state);

    let files = match state.results.current() {
        Some(result) if !result.generated_files.is_empty() => &result.generated_files,
        _ => {
            panels::placeholder(ui, "No files yet. Generate a project or load an example.");
            return;
        }
    };

    ensure_default_selection(files, &mut state.view.selected_file);
    let selected = state.view.selected_file.as_deref();
    let mut action = None;

    ScrollArea::horizontal()
        .id_salt("file_tabs")
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                for name in files.names() {
                    if ui.selectable_label(selected == Some(name), name).clicked() {
                        action = Some(InspectorAction::Select(name.to_string()));
                    }
                }
            });
        });
    ui.separator();

    match resolve_selection(files, selected) {
        Selection::File { name, content } => {
            let key = copy_key(name);
            ui.horizontal(|ui: &mut Ui| {
                ui.strong(name);
                ui.label(RichText::new(language_hint(name).label()).weak());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
                    let copied = state
                        .copy_feedback
                        .is_showing(&key, std::time::Instant::now());
                    let label = if copied { "Copied!" } else { "Copy" };
                    if ui.button(label).clicked() {
                        action = Some(InspectorAction::Copy {
                            key: key.clone(),
                            text: content.to_string(),
                        });
                    }
                });
            });
            ScrollArea::both()
                .id_salt("file_content")
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| render_code(ui, name, content));
        }
        Selection::Missing => panels::placeholder(ui, "No file selected."),
        Selection::Empty => panels::placeholder(ui, "No files yet."),
    }

    match action {
        Some(InspectorAction::Select(name)) => state.select_file(&name),
        Some(InspectorAction::Copy { key, text }) => state.copy_to_clipboard(clipboard, &key, &text),
        None => {}
    }
}

/// Highlighted view when the suffix maps to a language, plain read-only text otherwise.
pub fn render_code(ui: &mut Ui, file_name: &str, content: &str) {
    match language_hint(file_name).syntax_token() {
        Some(language) => show_highlighted(ui, content, language),
        None => {
            let mut text = content;
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .code_editor()
                    .desired_width(f32::INFINITY),
            );
        }
    }
}

pub fn show_highlighted(ui: &mut Ui, content: &str, language: &str) {
    let theme = CodeTheme::from_memory(ui.ctx(), ui.style());
    syntax_highlighting::code_view_ui(ui, &theme, content, language);
}
