use std::collections::BTreeMap;
use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::AggregateTable;
use crate::data::model::AgeValue;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Population trend by sex (multi-series line)
// ---------------------------------------------------------------------------

/// One line with markers per sex, year on x.
pub fn trend_by_sex(ui: &mut Ui, series: &BTreeMap<String, AggregateTable<i64>>, colors: &ColorMap) {
    ui.strong("Population Trends by Gender Over the Years");

    Plot::new("trend_by_sex")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Population")
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (sex, table) in series {
                let color = colors.color_for(sex);
                let points: Vec<[f64; 2]> = table
                    .rows()
                    .iter()
                    .map(|&(year, population)| [year as f64, population as f64])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(points.clone()))
                        .name(sex)
                        .color(color)
                        .width(2.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(sex)
                        .color(color)
                        .radius(4.0),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Age distribution (histogram)
// ---------------------------------------------------------------------------

/// Bars over age. Integer ages sit at their own x; bucket labels follow the
/// last integer age in key order.
pub fn age_histogram(ui: &mut Ui, table: &AggregateTable<AgeValue>) {
    ui.strong("Age Distribution");

    let mut next_x = 0.0;
    let bars: Vec<Bar> = table
        .rows()
        .iter()
        .map(|(age, population)| {
            let x = match age {
                AgeValue::Years(years) => *years as f64,
                AgeValue::Bucket(_) => next_x,
            };
            next_x = x + 1.0;
            Bar::new(x, *population as f64)
                .name(format!("age {age}"))
                .width(0.9)
        })
        .collect();

    Plot::new("age_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Age")
        .y_axis_label("Population")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Population")
                    .color(Color32::from_rgb(99, 110, 250)),
            );
        });
}

// ---------------------------------------------------------------------------
// Proportion chart (pie)
// ---------------------------------------------------------------------------

/// A pie of population shares with a legend listing percentages.
pub fn pie_chart(ui: &mut Ui, title: &str, table: &AggregateTable<String>, colors: &ColorMap) {
    ui.strong(title);

    let total = table.total();
    let side = CHART_HEIGHT.min(ui.available_width() * 0.6);

    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(side), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = side * 0.45;

        let mut start = -TAU / 4.0;
        for (label, population) in table.rows() {
            let sweep = share(*population, total) * TAU;
            for triangle in wedge(center, radius, start, sweep) {
                painter.add(Shape::convex_polygon(
                    triangle,
                    colors.color_for(label),
                    Stroke::NONE,
                ));
            }
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, population) in table.rows() {
                let pct = share(*population, total) * 100.0;
                ui.label(
                    egui::RichText::new(format!("■ {label}  {pct:.1}%"))
                        .color(colors.color_for(label)),
                );
            }
        });
    });
}

fn share(part: u64, total: u64) -> f32 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) as f32
    }
}

/// Split a circular sector into thin triangles so each piece is convex.
fn wedge(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    let steps = ((sweep / TAU) * 96.0).ceil().max(1.0) as usize;
    let step = sweep / steps as f32;
    let at = |angle: f32| center + Vec2::angled(angle) * radius;
    (0..steps)
        .map(|i| {
            let a = start + step * i as f32;
            vec![center, at(a), at(a + step)]
        })
        .collect()
}
