use eframe::egui::{Color32, RichText, ScrollArea, Slider, Ui};

use crate::dashboard::{Dashboard, DashboardView, ForecastSection, format_usd};
use crate::data::aggregate::Kpis;
use crate::forecast::Horizon;
use crate::forecast::export::EXPORT_FILE_NAME;
use crate::state::AppState;
use crate::ui::{plot, table};

const ACCENT: Color32 = Color32::from_rgb(0x60, 0xfc, 0x37);
const WARNING: Color32 = Color32::from_rgb(0xff, 0xc1, 0x07);
const SUCCESS: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);

/// Interactions that change state; applied after drawing.
enum Action {
    SetHorizon(u32),
    SaveForecast,
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the scrolling dashboard in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let action = ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| dashboard(ui, state))
        .inner;

    match action {
        Some(Action::SetHorizon(days)) => state.set_horizon(days),
        Some(Action::SaveForecast) => save_forecast(state),
        None => {}
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) -> Option<Action> {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(
            RichText::new("Startup Ecosystem Dashboard")
                .size(32.0)
                .strong()
                .color(ACCENT),
        );
        ui.label("Analyze startup trends using investment patterns, locations, and industries.");
    });
    ui.separator();

    let dash: &Dashboard = match &state.view {
        DashboardView::NoData { warning } => {
            warning_label(ui, warning);
            return None;
        }
        DashboardView::Loaded(dash) => dash.as_ref(),
    };

    ui.colored_label(SUCCESS, &dash.banner);
    ui.add_space(8.0);
    kpi_row(ui, &dash.kpis);
    ui.add_space(12.0);

    let charts = &dash.filtered.charts;

    section(ui, "Filtered Startup Dataset");
    table::funding_grid(ui, &state.session.table, &dash.filtered.indices);

    section(ui, "Investment Distribution by Industry");
    plot::industry_distribution(ui, &charts.industry_totals, &state.colors);

    section(ui, "Investment Over Time");
    match &charts.amount_over_time {
        Some(series) => plot::investment_over_time(ui, series, &state.colors),
        None => {
            ui.label(RichText::new("No dated rounds in the current selection.").weak());
        }
    }

    section(ui, "Top Cities by Investment");
    plot::top_cities(ui, &charts.top_cities);

    section(ui, "Growth of Startups Over the Years");
    plot::growth_over_years(ui, &charts.rounds_per_year, &charts.funding_per_year);

    section(ui, "Top Investors");
    plot::top_investors(ui, &charts.top_investors, &charts.investor_funding);

    section(ui, "Forecasting Future Funding Trends");
    forecast_section(ui, state.horizon, &dash.forecast)
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(RichText::new(title).strong());
}

fn warning_label(ui: &mut Ui, text: &str) {
    ui.colored_label(WARNING, format!("⚠ {text}"));
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Startups", kpis.total_startups.to_string());
        metric(&mut cols[1], "Total Funding", format_usd(kpis.total_funding));
        metric(
            &mut cols[2],
            "Top City",
            kpis.top_city.clone().unwrap_or_else(|| "N/A".to_string()),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.label(RichText::new(label).weak());
    ui.label(RichText::new(value).size(26.0).strong());
}

// ---------------------------------------------------------------------------
// Forecast section
// ---------------------------------------------------------------------------

fn forecast_section(ui: &mut Ui, horizon: Horizon, section: &ForecastSection) -> Option<Action> {
    if let ForecastSection::Skipped { warning } = section {
        warning_label(ui, warning);
        return None;
    }

    let mut action = None;
    let mut days = horizon.days();
    let slider = Slider::new(&mut days, Horizon::MIN_DAYS..=Horizon::MAX_DAYS)
        .step_by(f64::from(Horizon::STEP_DAYS))
        .text("Forecast Period (in Days)");
    if ui.add(slider).changed() && days != horizon.days() {
        action = Some(Action::SetHorizon(days));
    }

    match section {
        ForecastSection::Ready(report) => {
            ui.add_space(6.0);
            ui.label(RichText::new(format!("Forecast: {}", report.message())).strong());
            plot::forecast_plot(ui, report);
            if ui
                .button(format!("Download Forecast CSV ({EXPORT_FILE_NAME})"))
                .clicked()
            {
                action = Some(Action::SaveForecast);
            }
        }
        ForecastSection::Failed { error } => {
            ui.colored_label(Color32::RED, error);
        }
        ForecastSection::Skipped { .. } => {}
    }
    action
}

fn save_forecast(state: &mut AppState) {
    let DashboardView::Loaded(dash) = &state.view else {
        return;
    };
    let ForecastSection::Ready(report) = &dash.forecast else {
        return;
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title("Save forecast")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    if let Err(e) = report.write_csv(&path) {
        log::error!("Failed to save forecast: {e}");
        state.status_message = Some(format!("Error: {e}"));
    }
}
