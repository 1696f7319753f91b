use eframe::egui::{self, RichText, ScrollArea, Ui};

use lastmile_dash::data::aggregate::Kpis;
use lastmile_dash::data::model::Dimension;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Filters");
        if ui.small_button("Reset").clicked() {
            state.clear_all_filters();
        }
    });
    ui.label(RichText::new("Nothing ticked means no restriction.").weak());
    ui.separator();

    // Collect the requested change first, apply it after the widgets so the
    // view is recomputed at most once per frame.
    let mut toggled: Option<(Dimension, String)> = None;
    let mut cleared: Option<Dimension> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let n_total = state.dataset.options_for(dim).count();
                let n_selected = state.filters.count(dim);
                let header_text = if n_selected == 0 {
                    format!("{dim}  (all {n_total})")
                } else {
                    format!("{dim}  ({n_selected}/{n_total})")
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.column_name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        if state.filters.is_active(dim) && ui.small_button("Clear").clicked() {
                            cleared = Some(dim);
                        }

                        for value in state.dataset.options_for(dim) {
                            let mut checked = state.filters.is_selected(dim, value);
                            let text = RichText::new(value).color(state.color_for(dim, value));
                            if ui.checkbox(&mut checked, text).changed() {
                                toggled = Some((dim, value.to_string()));
                            }
                        }
                    });
            }
        });

    if let Some(dim) = cleared {
        state.clear_filter(dim);
    }
    if let Some((dim, value)) = toggled {
        state.toggle_filter_value(dim, &value);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with dataset counts.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.heading("Last Mile Delivery Dashboard");
        ui.separator();

        ui.label(format!(
            "{} deliveries loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        if let Some(threshold) = state.dataset.late_threshold {
            ui.separator();
            ui.label(format!("late above {threshold:.2} min"));
        }

        ui.separator();
        ui.toggle_value(&mut state.show_records, "Records");
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

/// Text of the three headline metrics; undefined means render as `NaN`.
pub fn kpi_texts(kpis: &Kpis) -> [(&'static str, String); 3] {
    let avg = kpis
        .avg_delivery_time
        .map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"));
    let late = kpis
        .percent_late
        .map_or_else(|| "NaN%".to_string(), |v| format!("{v:.2}%"));
    [
        ("Avg Delivery Time", avg),
        ("% Late Deliveries", late),
        ("Total Deliveries", kpis.total_count.to_string()),
    ]
}

/// Render the three KPI tiles side by side.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let tiles = kpi_texts(&state.summary.kpis);
    ui.columns(tiles.len(), |cols: &mut [Ui]| {
        for (col, (label, value)) in cols.iter_mut().zip(tiles) {
            col.vertical(|ui: &mut Ui| {
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(28.0).strong());
            });
        }
    });
}
