mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use clap::Parser;
use eframe::egui;
use lastmile_dash::config::Config;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::parse();

    // No data means nothing to show: fail before any window opens.
    let dataset = match lastmile_dash::data::load_dataset(&config.data, config.numeric_policy) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load dataset: {e:#}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let state = AppState::new(dataset);
    eframe::run_native(
        "Last Mile Delivery Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
