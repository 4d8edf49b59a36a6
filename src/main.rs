mod app;
mod clipboard;
mod config;
mod data;
mod service;
mod state;
mod ui;

use std::sync::Arc;

use app::SpatialCodeApp;
use clap::Parser;
use config::{Cli, Config};
use eframe::egui;
use service::HttpAnalysisService;

fn main() -> eframe::Result {
    let config = Config::from(Cli::parse());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter()))
        .init();

    let service = match HttpAnalysisService::new(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            log::error!("Cannot start: {e}");
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };
    log::info!("Using analysis service at {}", config.api_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "SpatialCode – Project Viewer",
        options,
        Box::new(move |cc| {
            // Install image loaders so egui can render png/jpg/etc.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(SpatialCodeApp::new(&cc.egui_ctx, &config, service)))
        }),
    )
}
