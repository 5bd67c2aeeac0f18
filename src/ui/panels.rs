use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{Dimension, Domain};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel. Any change re-runs the pipeline once.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    let dataset = Arc::clone(&state.dataset);
    let domains = dataset.domains();
    let selection = &mut state.selection;

    let mut changed = false;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= multiselect(ui, Dimension::County, &domains.county, &mut selection.county);
            changed |= multiselect(ui, Dimension::Sex, &domains.sex, &mut selection.sex);
            changed |= multiselect(
                ui,
                Dimension::MaritalStatus,
                &domains.marital_status,
                &mut selection.marital_status,
            );
            changed |= multiselect(ui, Dimension::Year, &domains.year, &mut selection.year);
        });

    if changed {
        state.refresh();
    }
}

/// One collapsible checkbox list. Returns whether the selection changed.
fn multiselect<T>(ui: &mut Ui, dim: Dimension, domain: &Domain<T>, selected: &mut BTreeSet<T>) -> bool
where
    T: Ord + Clone + Display,
{
    let mut changed = false;

    // Show count of selected / total in the header
    let header_text = format!("Select {}  ({}/{})", dim.label(), selected.len(), domain.len());
    let header = RichText::new(header_text).strong();
    let header = if selected.is_empty() {
        header.color(Color32::from_rgb(230, 140, 40))
    } else {
        header
    };

    egui::CollapsingHeader::new(header)
        .id_salt(dim.column())
        .default_open(dim != Dimension::County)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = domain.all();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for val in domain.values() {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, val.to_string()).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
                    changed = true;
                }
            }
        });

    changed
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
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} in view",
            state.dataset.len(),
            state.view.rows()
        ));

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
        .set_title("Open population data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
