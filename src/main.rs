#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod convert;
mod settings;
mod ui;
mod utils;
mod worker;

use anyhow::{anyhow, Context, Result};
use app::ConverterApp;
use eframe::egui;
use settings::Settings;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("file_converter_ui=info")),
        )
        .init();

    let settings = Settings::load();
    tracing::info!("Output folder: {}", settings.output_dir.display());

    let runtime = Runtime::new().context("failed to create Tokio runtime")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("File Converter")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "File Converter",
        options,
        Box::new(|_cc| Ok(Box::new(ConverterApp::new(settings, runtime)))),
    )
    .map_err(|e| anyhow!("{}", e))
}
