use std::fmt::Display;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Selection;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter Startups");
    ui.separator();

    if state.session.table.is_empty() {
        ui.label("No dataset loaded.");
        return;
    }

    // Edit a copy, then hand it back so only a real change triggers a refilter.
    let table = Arc::clone(&state.session.table);
    let mut criteria = state.criteria.clone();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            selection_combo(
                ui,
                "industry_filter",
                "Select Industry",
                &mut criteria.industry,
                table.industries.iter().cloned(),
            );
            selection_combo(
                ui,
                "city_filter",
                "Select City",
                &mut criteria.city,
                table.cities.iter().cloned(),
            );
            selection_combo(
                ui,
                "year_filter",
                "Select Year",
                &mut criteria.year,
                table.years.iter().copied(),
            );

            ui.add_space(8.0);
            reset = ui.button("Reset filters").clicked();
        });

    if reset {
        state.reset_filters();
    } else {
        state.set_criteria(criteria);
    }
}

/// Combo box offering `All` followed by every option.
fn selection_combo<T>(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &mut Selection<T>,
    options: impl Iterator<Item = T>,
) where
    T: Clone + PartialEq + Display,
{
    ui.strong(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(current, Selection::All, "All");
            for option in options {
                let text = option.to_string();
                ui.selectable_value(current, Selection::Only(option), text);
            }
        });
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                if let Some(path) = state.source.clone() {
                    state.open_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        let total = state.session.table.len();
        if total > 0 {
            ui.label(format!(
                "{total} startups loaded, {} visible",
                state.visible_count()
            ));
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open startup funding data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_path(&path);
    }
}
