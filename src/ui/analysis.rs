use eframe::egui::{Color32, RichText, ScrollArea, Ui};

use crate::data::classify::{classify, ProjectVerdict};
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Analysis tab
// ---------------------------------------------------------------------------

/// Badge labels for the facts that hold, in display order.
pub fn verdict_badges(verdict: &ProjectVerdict) -> Vec<String> {
    let mut badges = Vec::new();
    if verdict.has_frontend_entry {
        badges.push("Frontend".to_string());
    }
    if verdict.has_backend_marker {
        badges.push("Backend".to_string());
    }
    match verdict.html_file_names.len() {
        0 => {}
        1 => badges.push("1 HTML page".to_string()),
        n => badges.push(format!("{n} HTML pages")),
    }
    badges
}

pub fn analysis_view(ui: &mut Ui, state: &AppState) {
    panels::loading_indicator(ui, state);

    let Some(result) = state.results.current() else {
        panels::placeholder(ui, "No analysis yet.");
        return;
    };

    let verdict = classify(&result.generated_files);
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label(format!("{} files", result.generated_files.len()));
        if verdict.is_unclassified() {
            ui.label(RichText::new("no runnable project detected").weak());
        }
        for badge in verdict_badges(&verdict) {
            ui.label(RichText::new(badge).color(Color32::LIGHT_BLUE).strong());
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if result.summary.trim().is_empty() {
                ui.label(RichText::new("The service returned no summary.").weak());
            } else {
                ui.label(result.summary.as_str());
            }
        });
}
