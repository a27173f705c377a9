mod app;
mod color;
mod dashboard;
mod data;
mod forecast;
mod settings;
mod state;
mod ui;

use app::StartupDashboardApp;
use eframe::egui;
use settings::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load().unwrap_or_else(|e| {
        log::warn!("Invalid dashboard configuration, using defaults: {e:#}");
        Settings::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Startup Ecosystem Dashboard",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(StartupDashboardApp::new(settings)))
        }),
    )
}
