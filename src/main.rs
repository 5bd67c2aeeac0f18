use std::path::Path;

use anyhow::{Context, Result, anyhow};
use eframe::egui;

use sweden_stats::app::DashboardApp;
use sweden_stats::config::{CONFIG_FILE, DashboardConfig};
use sweden_stats::data::cache::DatasetCache;
use sweden_stats::state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE))?;

    // The dashboard has nothing to show without data: fail before opening a window.
    let cache = DatasetCache::new(&config.data_path);
    let state = AppState::new(config.clone(), cache).context("loading population data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        &config.title,
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running dashboard window: {e}"))
}
