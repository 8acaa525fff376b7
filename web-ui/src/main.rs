//! Desktop dashboard for the chemical product catalog.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use anyhow::Context;
use eframe::egui;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chem_catalog_core::{CatalogConfig, CatalogHttpClient};
use chem_catalog_ui::CatalogApp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr (if you run with `RUST_LOG=debug`).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = CatalogConfig::load().context("loading configuration")?;
    let client = CatalogHttpClient::from_config(&config).context("building catalog client")?;
    info!("catalog service at {}", client.base_url());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([800.0, 600.0]),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "Chemical Product Catalog",
        options,
        Box::new(move |cc| Ok(Box::new(CatalogApp::new(cc, Arc::new(client))))),
    )
    .map_err(|e| anyhow::anyhow!("desktop window failed: {e}"))
}
