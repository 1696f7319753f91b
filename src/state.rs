use std::collections::BTreeMap;

use lastmile_dash::data::aggregate::{
    agent_points, category_spread, summarize, AgentPoint, BoxSummary, Summary,
};
use lastmile_dash::data::filter::{filtered_indices, FilterSelection};
use lastmile_dash::data::model::{DeliveryDataset, Dimension};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Session dataset, loaded once before the window opens.
    pub dataset: DeliveryDataset,

    /// Per-dimension filter selections.
    pub filters: FilterSelection,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// KPIs and group means of the visible records.
    pub summary: Summary,

    /// Agent scatter input for the visible records.
    pub agent_points: Vec<AgentPoint>,

    /// Delivery-time distribution per category for the visible records.
    pub category_spread: BTreeMap<String, BoxSummary>,

    /// Stable colours per dimension value, built from the unfiltered options.
    pub color_maps: BTreeMap<Dimension, ColorMap>,

    /// Whether the record table is shown below the charts.
    pub show_records: bool,
}

impl AppState {
    pub fn new(dataset: DeliveryDataset) -> Self {
        let color_maps = Dimension::ALL
            .iter()
            .map(|&dim| (dim, ColorMap::new(dataset.options_for(dim))))
            .collect();

        let mut state = Self {
            dataset,
            filters: FilterSelection::all(),
            visible_indices: Vec::new(),
            summary: Summary::default(),
            agent_points: Vec::new(),
            category_spread: BTreeMap::new(),
            color_maps,
            show_records: false,
        };
        state.refilter();
        state
    }

    /// Recompute the view and every aggregate after a filter change.
    pub fn refilter(&mut self) {
        let ds = &self.dataset;
        self.visible_indices = filtered_indices(ds, &self.filters);
        self.summary = summarize(ds, &self.visible_indices);
        self.agent_points = agent_points(ds, &self.visible_indices);
        self.category_spread = category_spread(ds, &self.visible_indices);
        log::debug!(
            "Filters {:?} → {} of {} deliveries",
            self.filters,
            self.visible_indices.len(),
            ds.len()
        );
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        self.filters.toggle(dim, value);
        self.refilter();
    }

    /// Remove the restriction on one dimension.
    pub fn clear_filter(&mut self, dim: Dimension) {
        self.filters.clear(dim);
        self.refilter();
    }

    /// Remove every restriction.
    pub fn clear_all_filters(&mut self) {
        self.filters.clear_all();
        self.refilter();
    }

    pub fn color_for(&self, dim: Dimension, value: &str) -> eframe::egui::Color32 {
        self.color_maps
            .get(&dim)
            .map(|cm| cm.color_for(value))
            .unwrap_or(eframe::egui::Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lastmile_dash::data::model::DeliveryRecord;

    use super::*;

    fn rec(weather: &str, vehicle: &str, time: f64) -> DeliveryRecord {
        DeliveryRecord {
            delivery_time: Some(time),
            agent_age: Some(28.0),
            agent_rating: Some(4.6),
            weather: weather.into(),
            traffic: "Low".into(),
            vehicle: vehicle.into(),
            area: "Urban".into(),
            category: "Electronics".into(),
            extra: BTreeMap::new(),
            late: false,
        }
    }

    fn state() -> AppState {
        AppState::new(DeliveryDataset::from_records(
            vec![
                rec("Sunny", "van", 20.0),
                rec("Rainy", "van", 40.0),
                rec("Rainy", "scooter", 60.0),
            ],
            Vec::new(),
            None,
        ))
    }

    #[test]
    fn starts_unfiltered() {
        let s = state();
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
        assert_eq!(s.summary.kpis.total_count, 3);
        assert_eq!(s.agent_points.len(), 3);
        assert_eq!(s.category_spread.len(), 1);
    }

    #[test]
    fn every_toggle_recomputes_aggregates() {
        let mut s = state();
        s.toggle_filter_value(Dimension::Weather, "Rainy");
        assert_eq!(s.visible_indices, vec![1, 2]);
        assert_eq!(s.summary.kpis.avg_delivery_time, Some(50.0));

        s.toggle_filter_value(Dimension::Vehicle, "van");
        assert_eq!(s.visible_indices, vec![1]);

        s.toggle_filter_value(Dimension::Vehicle, "bicycle");
        assert_eq!(s.visible_indices, vec![1]);

        s.clear_filter(Dimension::Vehicle);
        assert_eq!(s.visible_indices, vec![1, 2]);

        s.toggle_filter_value(Dimension::Weather, "Rainy");
        assert_eq!(s.visible_indices, vec![0, 1, 2]);
    }

    #[test]
    fn empty_selection_result_keeps_state_consistent() {
        let mut s = state();
        s.toggle_filter_value(Dimension::Weather, "Sunny");
        s.toggle_filter_value(Dimension::Vehicle, "scooter");
        assert!(s.visible_indices.is_empty());
        assert_eq!(s.summary.kpis.total_count, 0);
        assert!(s.agent_points.is_empty());
        assert!(s.category_spread.is_empty());

        s.clear_all_filters();
        assert_eq!(s.visible_indices.len(), 3);
    }

    #[test]
    fn filter_options_survive_toggling() {
        let mut s = state();
        s.toggle_filter_value(Dimension::Weather, "Sunny");
        assert_eq!(s.visible_indices, vec![0]);
        let weather: Vec<&str> = s.dataset.options_for(Dimension::Weather).collect();
        assert_eq!(weather, vec!["Rainy", "Sunny"]);
        let vehicle: Vec<&str> = s.dataset.options_for(Dimension::Vehicle).collect();
        assert_eq!(vehicle, vec!["scooter", "van"]);
    }

    #[test]
    fn colours_come_from_unfiltered_options() {
        let mut s = state();
        let before = s.color_for(Dimension::Weather, "Sunny");
        s.toggle_filter_value(Dimension::Weather, "Rainy");
        assert_eq!(s.color_for(Dimension::Weather, "Sunny"), before);
    }
}
