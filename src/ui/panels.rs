use eframe::egui::{self, Color32, DroppedFile, RichText, Ui};

use crate::data::loader::{self, IMAGE_EXTENSIONS};
use crate::data::model::ImagePayload;
use crate::data::validate::ValidationError;
use crate::state::{AppState, ServiceStatus, StatusLine, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Choose image…").clicked() {
                choose_image_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.view.loading, egui::Button::new("Open result…"))
                .clicked()
            {
                open_result_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.results.current().is_some(), egui::Button::new("Export files…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        match &state.service_status {
            ServiceStatus::Unknown => {
                ui.label(RichText::new("● service: checking").weak());
            }
            ServiceStatus::Healthy => {
                ui.label(RichText::new("● service: online").color(Color32::GREEN));
            }
            ServiceStatus::Unreachable(reason) => {
                ui.label(RichText::new("● service: offline").color(Color32::RED))
                    .on_hover_text(reason.as_str());
            }
        }

        if let Some(result) = state.results.current() {
            ui.separator();
            ui.label(format!("{} files", result.generated_files.len()));
        }

        match &state.status {
            Some(StatusLine::Info(msg)) => {
                ui.separator();
                ui.label(msg.as_str());
            }
            Some(StatusLine::Error(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg.as_str()).color(Color32::RED));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Tab strip and banners
// ---------------------------------------------------------------------------

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui
                .selectable_label(state.view.active_tab == tab, tab.label())
                .clicked()
            {
                state.select_tab(tab);
            }
        }
        if state.view.loading {
            ui.separator();
            ui.add(egui::Spinner::new());
        }
    });

    if let Some(msg) = state.view.error_message.clone() {
        ui.horizontal(|ui: &mut Ui| {
            ui.label(RichText::new(msg).color(Color32::RED).strong());
            if ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                state.dismiss_error();
            }
        });
    }
}

/// In-flight indicator shown on every tab while a request runs.
pub fn loading_indicator(ui: &mut Ui, state: &AppState) {
    if state.view.loading {
        ui.horizontal(|ui: &mut Ui| {
            ui.add(egui::Spinner::new());
            ui.label("Generating…");
        });
        ui.separator();
    }
}

pub fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(RichText::new(text).weak());
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn choose_image_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a UI screenshot")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file();

    if let Some(path) = file {
        match loader::load_image(&path) {
            Ok(image) => state.set_image(image),
            Err(e) => {
                log::error!("Failed to load image: {e:#}");
                state.status = Some(StatusLine::Error(format!("Error: {e:#}")));
            }
        }
    }
}

pub fn open_result_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open analysis result")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_result_file(&path) {
            Ok(result) => {
                log::info!(
                    "Loaded result with {} files from {}",
                    result.generated_files.len(),
                    path.display()
                );
                state.store_result(result);
                state.select_tab(Tab::Code);
                state.status = Some(StatusLine::Info(format!("Opened {}", path.display())));
            }
            Err(e) => {
                log::error!("Failed to load result: {e:#}");
                state.status = Some(StatusLine::Error(format!("Error: {e:#}")));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(result) = state.results.current() else {
        return;
    };
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Export generated files")
        .pick_folder()
    else {
        return;
    };

    state.status = Some(match loader::export_files(&result.generated_files, &dir) {
        Ok(report) if report.skipped.is_empty() => {
            log::info!("Exported {} files to {}", report.written, dir.display());
            StatusLine::Info(format!("Exported {} files to {}", report.written, dir.display()))
        }
        Ok(report) => StatusLine::Error(format!(
            "Exported {} files; skipped unsafe names: {}",
            report.written,
            report.skipped.join(", ")
        )),
        Err(e) => {
            log::error!("Export failed: {e:#}");
            StatusLine::Error(format!("Error: {e:#}"))
        }
    });
}

// ---------------------------------------------------------------------------
// Drag and drop
// ---------------------------------------------------------------------------

/// Take the first dropped file as the input image.
pub fn accept_dropped_files(state: &mut AppState, files: &[DroppedFile]) {
    let Some(file) = files.first() else {
        return;
    };

    let loaded = if let Some(path) = &file.path {
        loader::load_image(path)
    } else if let Some(bytes) = &file.bytes {
        ImagePayload::sniff(file.name.clone(), bytes.clone())
            .ok_or_else(|| anyhow::Error::from(ValidationError::NotAnImage))
    } else {
        return;
    };

    match loaded {
        Ok(image) => state.set_image(image),
        Err(e) => {
            log::warn!("Dropped file rejected: {e:#}");
            state.status = Some(StatusLine::Error(format!("Error: {e:#}")));
        }
    }
}
