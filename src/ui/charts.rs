use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoints, Points,
};

use lastmile_dash::data::model::Dimension;

use crate::color::{gradient, normalize};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 240.0;
const AGE_BANDS: usize = 6;

// ---------------------------------------------------------------------------
// Dashboard layout (central panel)
// ---------------------------------------------------------------------------

/// Render every chart for the current filtered view.
pub fn dashboard_charts(ui: &mut Ui, state: &AppState) {
    ui.heading("Delay Analyzer (Weather & Traffic)");
    ui.columns(2, |cols: &mut [Ui]| {
        group_bar_chart(&mut cols[0], state, Dimension::Weather);
        group_bar_chart(&mut cols[1], state, Dimension::Traffic);
    });
    ui.add_space(8.0);

    ui.heading("Vehicle Performance Comparison");
    group_bar_chart(ui, state, Dimension::Vehicle);
    ui.add_space(8.0);

    ui.heading("Agent Performance");
    agent_scatter(ui, state);
    ui.add_space(8.0);

    ui.heading("Area Heatmap");
    area_heatmap(ui, state);
    ui.add_space(8.0);

    ui.heading("Category Delivery Time Distribution");
    category_box_plot(ui, state);
}

fn empty_notice(ui: &mut Ui) {
    ui.label(RichText::new("No deliveries match the current filters.").weak());
}

/// X-axis labels for a chart whose arguments are 0, 1, 2, … category slots.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let slot = mark.value.round();
        if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
            return String::new();
        }
        labels.get(slot as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Group-mean bar charts
// ---------------------------------------------------------------------------

/// Bars of mean Delivery_Time per value of `dim` present in the view.
fn group_bar_chart(ui: &mut Ui, state: &AppState, dim: Dimension) {
    ui.label(RichText::new(format!("Avg Delivery Time by {dim}")).strong());

    let groups: Vec<(&str, f64)> = state
        .summary
        .group_mean(dim)
        .filter_map(|(value, stat)| Some((value, stat.mean?)))
        .collect();
    if groups.is_empty() {
        empty_notice(ui);
        return;
    }

    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .map(|(slot, &(value, mean))| {
            Bar::new(slot as f64, mean)
                .name(value)
                .fill(state.color_for(dim, value))
                .width(0.7)
        })
        .collect();
    let labels = groups.iter().map(|(value, _)| value.to_string()).collect();

    Plot::new(("group_bars", dim.column_name()))
        .height(CHART_HEIGHT)
        .x_axis_label(dim.column_name())
        .y_axis_label("Delivery_Time")
        .x_axis_formatter(category_axis(labels))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Agent scatter
// ---------------------------------------------------------------------------

/// Agent_Rating vs Delivery_Time, one series per age band.
fn agent_scatter(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("Agent Rating vs Delivery Time (coloured by age)").strong());

    let points = &state.agent_points;
    if points.is_empty() {
        empty_notice(ui);
        return;
    }

    let min_age = points.iter().map(|p| p.age).fold(f64::INFINITY, f64::min);
    let max_age = points.iter().map(|p| p.age).fold(f64::NEG_INFINITY, f64::max);
    let band_of = |age: f64| {
        let t = normalize(age, min_age, max_age);
        ((t * AGE_BANDS as f64) as usize).min(AGE_BANDS - 1)
    };

    let mut bands: Vec<Vec<[f64; 2]>> = vec![Vec::new(); AGE_BANDS];
    for p in points {
        bands[band_of(p.age)].push([p.rating, p.delivery_time]);
    }
    let band_width = (max_age - min_age) / AGE_BANDS as f64;

    Plot::new("agent_scatter")
        .height(CHART_HEIGHT * 1.3)
        .legend(Legend::default())
        .x_axis_label("Agent_Rating")
        .y_axis_label("Delivery_Time")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (band, coords) in bands.into_iter().enumerate() {
                if coords.is_empty() {
                    continue;
                }
                let lo = min_age + band as f64 * band_width;
                let name = format!("age {:.0}–{:.0}", lo, lo + band_width);
                let t = (band as f64 + 0.5) / AGE_BANDS as f64;
                plot_ui.points(
                    Points::new(PlotPoints::new(coords))
                        .name(name)
                        .color(gradient(t))
                        .radius(2.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Area heatmap
// ---------------------------------------------------------------------------

/// One tile per Area, shaded by its mean Delivery_Time relative to the other areas.
fn area_heatmap(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("Avg Delivery Time by Area").strong());

    let areas: Vec<(&str, f64, usize)> = state
        .summary
        .group_mean(Dimension::Area)
        .filter_map(|(value, stat)| Some((value, stat.mean?, stat.count)))
        .collect();
    if areas.is_empty() {
        empty_notice(ui);
        return;
    }

    let min = areas.iter().map(|a| a.1).fold(f64::INFINITY, f64::min);
    let max = areas.iter().map(|a| a.1).fold(f64::NEG_INFINITY, f64::max);

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for &(area, mean, count) in &areas {
            let (rect, response) = ui.allocate_exact_size(egui::vec2(150.0, 64.0), Sense::hover());
            let painter = ui.painter();
            painter.rect_filled(rect, 4.0, gradient(normalize(mean, min, max)));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                format!("{area}\n{mean:.2} min"),
                FontId::proportional(14.0),
                Color32::WHITE,
            );
            response.on_hover_text(format!("{count} deliveries"));
        }
    });
    ui.label(RichText::new(format!("scale: {min:.2} (cool) … {max:.2} (hot) min")).weak());
}

// ---------------------------------------------------------------------------
// Category box plot
// ---------------------------------------------------------------------------

/// Delivery_Time distribution per Category with outliers drawn as points.
fn category_box_plot(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new("Delivery Time by Category").strong());

    if state.category_spread.is_empty() {
        empty_notice(ui);
        return;
    }

    let mut boxes = Vec::with_capacity(state.category_spread.len());
    let mut outliers = Vec::new();
    for (slot, (category, summary)) in state.category_spread.iter().enumerate() {
        let color = state.color_for(Dimension::Category, category);
        let x = slot as f64;
        boxes.push(
            BoxElem::new(
                x,
                BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                ),
            )
            .name(format!("{category} (n={})", summary.count))
            .box_width(0.6)
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color)),
        );
        outliers.extend(summary.outliers.iter().map(|&y| [x, y]));
    }
    let labels = state.category_spread.keys().cloned().collect();

    Plot::new("category_box")
        .height(CHART_HEIGHT * 1.3)
        .x_axis_label("Category")
        .y_axis_label("Delivery_Time")
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
            if !outliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::new(outliers))
                        .name("outliers")
                        .color(Color32::GRAY)
                        .radius(2.0),
                );
            }
        });
}
