use std::sync::Arc;
use std::time::Instant;

use eframe::egui;

use crate::clipboard::SystemClipboard;
use crate::config::Config;
use crate::data::loader;
use crate::service::AnalysisService;
use crate::state::{AppState, StatusLine, Tab};
use crate::ui::{analysis, code, input, panels, preview};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SpatialCodeApp {
    pub state: AppState,
    service: Arc<dyn AnalysisService>,
    clipboard: SystemClipboard,
}

impl SpatialCodeApp {
    pub fn new(ctx: &egui::Context, config: &Config, service: Arc<dyn AnalysisService>) -> Self {
        let mut state = AppState::default();

        let repaint_ctx = ctx.clone();
        state.set_repaint_hook(Arc::new(move || repaint_ctx.request_repaint()));
        state.refresh_catalog(&service);

        if let Some(path) = &config.initial_result {
            match loader::load_result_file(path) {
                Ok(result) => {
                    log::info!("Opened {} at startup", path.display());
                    state.store_result(result);
                    state.select_tab(Tab::Code);
                }
                Err(e) => {
                    log::error!("Failed to open {}: {e:#}", path.display());
                    state.status = Some(StatusLine::Error(format!("Error: {e:#}")));
                }
            }
        }

        Self {
            state,
            service,
            clipboard: SystemClipboard::default(),
        }
    }
}

impl eframe::App for SpatialCodeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll();

        let now = Instant::now();
        self.state.copy_feedback.expire(now);
        if let Some(wait) = self.state.copy_feedback.remaining(now) {
            ctx.request_repaint_after(wait);
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            panels::accept_dropped_files(&mut self.state, &dropped);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Tabs and error banner ----
        egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
            panels::tab_bar(ui, &mut self.state);
        });

        // ---- Central panel: active view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view.active_tab {
            Tab::Input => input::input_view(ui, &mut self.state, &self.service),
            Tab::Code => code::code_inspector(ui, &mut self.state, &mut self.clipboard),
            Tab::Preview => preview::preview_pane(ui, &mut self.state, &mut self.clipboard),
            Tab::Analysis => analysis::analysis_view(ui, &self.state),
        });
    }
}
