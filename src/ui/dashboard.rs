use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{AggregateSet, KpiSummary};
use crate::pipeline::{ViewModel, format_thousands};
use crate::state::AppState;

use super::plot;

// ---------------------------------------------------------------------------
// Main area: title, KPIs, charts
// ---------------------------------------------------------------------------

/// Render the central panel from the last view model.
pub fn main_view(ui: &mut Ui, state: &AppState) {
    let (kpis, aggregates) = match &state.view {
        ViewModel::NoData(reason) => {
            no_data(ui, &reason.to_string());
            return;
        }
        ViewModel::Dashboard {
            kpis, aggregates, ..
        } => (kpis, aggregates),
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(RichText::new(format!("📊 {}", state.config.title)).size(28.0));
            ui.add_space(16.0);

            kpi_row(ui, kpis);
            ui.separator();
            charts(ui, state, aggregates);
        });
}

fn no_data(ui: &mut Ui, detail: &str) {
    egui::Frame::group(ui.style())
        .fill(Color32::from_rgb(255, 244, 214))
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new("⚠ No data available based on the current filter settings!")
                    .color(Color32::from_rgb(120, 80, 0))
                    .strong(),
            );
            ui.label(RichText::new(detail).color(Color32::from_rgb(120, 80, 0)));
        });
}

fn kpi_row(ui: &mut Ui, kpis: &KpiSummary) {
    ui.columns(3, |cols| {
        kpi_cell(
            &mut cols[0],
            "Total Population:",
            &format_thousands(kpis.total_population),
        );
        kpi_cell(&mut cols[1], "Most Marital Status:", &kpis.modal_marital_status);
        kpi_cell(
            &mut cols[2],
            "Total Counties:",
            &kpis.distinct_counties.to_string(),
        );
    });
}

fn kpi_cell(ui: &mut Ui, label: &str, value: &str) {
    ui.label(RichText::new(label).size(18.0).strong());
    ui.label(RichText::new(value).size(18.0));
}

fn charts(ui: &mut Ui, state: &AppState, aggregates: &AggregateSet) {
    ui.columns(2, |cols| {
        plot::trend_by_sex(&mut cols[0], &aggregates.by_sex_year, &state.sex_colors);
        cols[0].add_space(12.0);
        plot::pie_chart(
            &mut cols[0],
            "Marital Status Distribution",
            &aggregates.by_marital_status,
            &state.marital_colors,
        );

        plot::pie_chart(
            &mut cols[1],
            "Sex Distribution",
            &aggregates.by_sex,
            &state.sex_colors,
        );
        cols[1].add_space(12.0);
        plot::age_histogram(&mut cols[1], &aggregates.by_age);
    });
}
