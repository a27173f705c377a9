use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{DISPLAY_COLUMNS, FundingTable};

const ROW_HEIGHT: f32 = 18.0;
const MAX_HEIGHT: f32 = 320.0;

/// Scrollable grid of the filtered rows. Only visible rows are laid out.
pub fn funding_grid(ui: &mut Ui, table: &FundingTable, indices: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(MAX_HEIGHT)
        .columns(
            Column::auto().at_least(70.0).clip(true),
            DISPLAY_COLUMNS.len(),
        )
        .header(20.0, |mut header| {
            for name in DISPLAY_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                let Some(rec) = indices
                    .get(row.index())
                    .and_then(|&i| table.records.get(i))
                else {
                    return;
                };
                for cell in rec.display_cells() {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
