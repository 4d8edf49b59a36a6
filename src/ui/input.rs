use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};

use crate::data::validate::MAX_DESCRIPTION_CHARS;
use crate::service::{example_label, AnalysisService};
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// Input tab: image, description, examples
// ---------------------------------------------------------------------------

pub fn input_view(ui: &mut Ui, state: &mut AppState, service: &Arc<dyn AnalysisService>) {
    panels::loading_indicator(ui, state);
    let idle = !state.view.loading;

    ui.heading("Describe your app");
    ui.add_space(4.0);

    // ---- Image ----
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Choose image…").clicked() {
            panels::choose_image_dialog(state);
        }
        match &state.image {
            Some(image) => {
                ui.label(format!("{} ({} KiB)", image.file_name, image.len().div_ceil(1024)));
            }
            None => {
                ui.label(RichText::new("or drop an image onto the window").weak());
            }
        }
    });
    if let Some(image) = &state.image {
        ui.add(
            egui::Image::from_bytes(image.uri(), image.bytes.clone())
                .max_width(ui.available_width().min(480.0))
                .max_height(240.0),
        );
    }
    ui.add_space(8.0);

    // ---- Description ----
    ui.label("Description");
    let edited = ui
        .add(
            egui::TextEdit::multiline(&mut state.description)
                .hint_text("e.g. An inventory tracker for a community food pantry")
                .char_limit(MAX_DESCRIPTION_CHARS)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        )
        .changed();
    if edited {
        state.input_changed();
    }
    let used = state.description.trim().chars().count();
    ui.label(RichText::new(format!("{used}/{MAX_DESCRIPTION_CHARS}")).small().weak());
    ui.add_space(8.0);

    if ui
        .add_enabled(idle, egui::Button::new(RichText::new("Generate").strong()))
        .clicked()
    {
        state.submit_generate(service);
    }

    // ---- Examples ----
    ui.add_space(16.0);
    ui.separator();
    ui.strong("Or start from an example");
    if state.examples.is_empty() {
        ui.label(RichText::new("No examples available.").weak());
        return;
    }

    let mut picked = None;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for id in &state.examples {
            if ui
                .add_enabled(idle, egui::Button::new(example_label(id)))
                .on_hover_text(id.as_str())
                .clicked()
            {
                picked = Some(id.clone());
            }
        }
    });
    if let Some(id) = picked {
        state.select_example(&id, service);
    }
}
