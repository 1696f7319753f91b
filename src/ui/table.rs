use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use lastmile_dash::data::model::{DeliveryRecord, Dimension};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

fn fmt_num(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v}"))
}

/// Cells of one record in column order: numeric fields, dimensions, Late,
/// then pass-through columns.
fn record_cells(rec: &DeliveryRecord, extra_columns: &[String]) -> Vec<String> {
    let mut cells = vec![
        fmt_num(rec.delivery_time),
        fmt_num(rec.agent_age),
        fmt_num(rec.agent_rating),
    ];
    cells.extend(Dimension::ALL.iter().map(|&d| rec.dimension_value(d).to_string()));
    cells.push(rec.late.to_string());
    cells.extend(
        extra_columns
            .iter()
            .map(|c| rec.extra.get(c).cloned().unwrap_or_default()),
    );
    cells
}

/// Scrollable table of the records in the current view.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    ui.heading(format!("Records ({})", state.visible_indices.len()));

    let mut headers: Vec<&str> = vec!["Delivery_Time", "Agent_Age", "Agent_Rating"];
    headers.extend(Dimension::ALL.iter().map(|d| d.column_name()));
    headers.push("Late");
    headers.extend(state.dataset.extra_columns.iter().map(String::as_str));

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(360.0)
        .columns(Column::auto().at_least(60.0), headers.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in &headers {
                header.col(|ui| {
                    ui.label(RichText::new(*name).strong());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let Some(rec) = state
                    .visible_indices
                    .get(row.index())
                    .and_then(|&i| state.dataset.records.get(i))
                else {
                    return;
                };
                for cell in record_cells(rec, &state.dataset.extra_columns) {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn cells_follow_header_order() {
        let rec = DeliveryRecord {
            delivery_time: Some(120.0),
            agent_age: None,
            agent_rating: Some(4.8),
            weather: "Sunny".into(),
            traffic: "Jam".into(),
            vehicle: "van".into(),
            area: "Urban".into(),
            category: "Toys".into(),
            extra: BTreeMap::from([("Order_ID".to_string(), "x1".to_string())]),
            late: true,
        };
        let cells = record_cells(&rec, &["Order_ID".to_string(), "Pickup_Time".to_string()]);
        assert_eq!(
            cells,
            vec![
                "120", "NaN", "4.8", "Sunny", "Jam", "van", "Urban", "Toys", "true", "x1", ""
            ]
        );
    }
}
