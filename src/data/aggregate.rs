use std::collections::BTreeMap;

use super::model::{DeliveryDataset, Dimension};
use super::stats::{quantile_sorted, round2};

// ---------------------------------------------------------------------------
// KPI + group-by summary of a filtered view
// ---------------------------------------------------------------------------

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kpis {
    /// Mean Delivery_Time rounded to two decimals; `None` when the view has no
    /// delivery times (rendered as `NaN`).
    pub avg_delivery_time: Option<f64>,
    /// Share of late rows × 100, rounded to two decimals; `None` for an empty view.
    pub percent_late: Option<f64>,
    pub total_count: usize,
}

/// One group of a GroupMean table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupStat {
    /// Rows in the view having this value.
    pub count: usize,
    /// Mean Delivery_Time of those rows, `None` if all of them are null.
    pub mean: Option<f64>,
}

/// Everything the dashboard derives from the current selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub kpis: Kpis,
    /// dimension → value present in the view → mean Delivery_Time.
    pub group_means: BTreeMap<Dimension, BTreeMap<String, GroupStat>>,
}

impl Summary {
    /// GroupMean table of one dimension; empty if nothing matched.
    pub fn group_mean(&self, dim: Dimension) -> impl Iterator<Item = (&str, &GroupStat)> {
        self.group_means
            .get(&dim)
            .into_iter()
            .flat_map(|groups| groups.iter().map(|(k, v)| (k.as_str(), v)))
    }
}

#[derive(Default)]
struct Acc {
    sum: f64,
    timed: usize,
    rows: usize,
}

impl Acc {
    fn push(&mut self, time: Option<f64>) {
        self.rows += 1;
        if let Some(t) = time {
            self.sum += t;
            self.timed += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.timed > 0).then(|| self.sum / self.timed as f64)
    }
}

/// Compute KPIs and the five GroupMean tables in a single pass over `view`.
///
/// Indices outside the dataset are ignored.
pub fn summarize(dataset: &DeliveryDataset, view: &[usize]) -> Summary {
    let mut overall = Acc::default();
    let mut late = 0usize;
    let mut groups: BTreeMap<Dimension, BTreeMap<&str, Acc>> = BTreeMap::new();

    for rec in view.iter().filter_map(|&i| dataset.records.get(i)) {
        overall.push(rec.delivery_time);
        if rec.late {
            late += 1;
        }
        for dim in Dimension::ALL {
            groups
                .entry(dim)
                .or_default()
                .entry(rec.dimension_value(dim))
                .or_default()
                .push(rec.delivery_time);
        }
    }

    let total_count = overall.rows;
    let kpis = Kpis {
        avg_delivery_time: overall.mean().map(round2),
        percent_late: (total_count > 0)
            .then(|| round2(late as f64 / total_count as f64 * 100.0)),
        total_count,
    };

    let group_means = groups
        .into_iter()
        .map(|(dim, accs)| {
            let table = accs
                .into_iter()
                .map(|(value, acc)| {
                    let stat = GroupStat {
                        count: acc.rows,
                        mean: acc.mean(),
                    };
                    (value.to_string(), stat)
                })
                .collect();
            (dim, table)
        })
        .collect();

    Summary { kpis, group_means }
}

// ---------------------------------------------------------------------------
// Chart inputs beyond the group means
// ---------------------------------------------------------------------------

/// One point of the agent scatter plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentPoint {
    pub rating: f64,
    pub delivery_time: f64,
    pub age: f64,
}

/// Agent rating vs delivery time for every row with all three values.
pub fn agent_points(dataset: &DeliveryDataset, view: &[usize]) -> Vec<AgentPoint> {
    view.iter()
        .filter_map(|&i| dataset.records.get(i))
        .filter_map(|rec| {
            Some(AgentPoint {
                rating: rec.agent_rating?,
                delivery_time: rec.delivery_time?,
                age: rec.agent_age?,
            })
        })
        .collect()
}

/// Box-plot description of one group's delivery times.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Values beyond 1.5 × IQR from the quartiles.
    pub outliers: Vec<f64>,
    pub count: usize,
}

impl BoxSummary {
    /// Quartiles are linear-interpolated; whiskers reach the furthest values
    /// within 1.5 × IQR of the box.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        values.sort_by(f64::total_cmp);
        let q1 = quantile_sorted(&values, 0.25)?;
        let median = quantile_sorted(&values, 0.5)?;
        let q3 = quantile_sorted(&values, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let (inside, outliers): (Vec<f64>, Vec<f64>) = values
            .iter()
            .partition(|v| (lo_fence..=hi_fence).contains(*v));
        let lower_whisker = inside.iter().copied().fold(f64::INFINITY, f64::min).min(q1);
        let upper_whisker = inside.iter().copied().fold(f64::NEG_INFINITY, f64::max).max(q3);

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
            count: values.len(),
        })
    }
}

/// Delivery-time distribution per Category present in the view.
pub fn category_spread(dataset: &DeliveryDataset, view: &[usize]) -> BTreeMap<String, BoxSummary> {
    let mut by_category: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in view.iter().filter_map(|&i| dataset.records.get(i)) {
        let times = by_category.entry(rec.category.as_str()).or_default();
        if let Some(t) = rec.delivery_time {
            times.push(t);
        }
    }

    by_category
        .into_iter()
        .filter_map(|(cat, times)| Some((cat.to_string(), BoxSummary::from_values(times)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FilterSelection};
    use crate::data::model::fixtures::{dataset, record, weather_record};

    fn two_rows() -> DeliveryDataset {
        dataset(vec![weather_record("Sunny", 20.0), weather_record("Rainy", 40.0)])
    }

    fn weather_means(summary: &Summary) -> Vec<(String, Option<f64>)> {
        summary
            .group_mean(Dimension::Weather)
            .map(|(k, s)| (k.to_string(), s.mean))
            .collect()
    }

    #[test]
    fn group_mean_over_unfiltered_view() {
        let ds = two_rows();
        let summary = summarize(&ds, &filtered_indices(&ds, &FilterSelection::all()));
        assert_eq!(
            weather_means(&summary),
            vec![("Rainy".into(), Some(40.0)), ("Sunny".into(), Some(20.0))]
        );
        assert_eq!(summary.kpis.avg_delivery_time, Some(30.0));
        assert_eq!(summary.kpis.total_count, 2);
    }

    #[test]
    fn filtered_out_groups_are_absent() {
        let ds = two_rows();
        let sel = FilterSelection::all().with(Dimension::Weather, ["Sunny"]);
        let summary = summarize(&ds, &filtered_indices(&ds, &sel));
        assert_eq!(weather_means(&summary), vec![("Sunny".into(), Some(20.0))]);
    }

    #[test]
    fn empty_view_degrades_gracefully() {
        let ds = two_rows();
        let sel = FilterSelection::all().with(Dimension::Weather, ["Stormy"]);
        let view = filtered_indices(&ds, &sel);
        let summary = summarize(&ds, &view);

        assert_eq!(summary.kpis.total_count, 0);
        assert_eq!(summary.kpis.avg_delivery_time, None);
        assert_eq!(summary.kpis.percent_late, None);
        for dim in Dimension::ALL {
            assert_eq!(summary.group_mean(dim).count(), 0);
        }
        assert!(agent_points(&ds, &view).is_empty());
        assert!(category_spread(&ds, &view).is_empty());
    }

    #[test]
    fn percent_late_and_rounding() {
        let mut recs = vec![
            weather_record("Sunny", 10.0),
            weather_record("Sunny", 10.0),
            weather_record("Sunny", 11.0),
        ];
        recs[2].late = true;
        let ds = dataset(recs);
        let summary = summarize(&ds, &[0, 1, 2]);
        assert_eq!(summary.kpis.percent_late, Some(33.33));
        assert_eq!(summary.kpis.avg_delivery_time, Some(10.33));
        let pct = summary.kpis.percent_late.unwrap();
        assert!((0.0..=100.0).contains(&pct));
    }

    #[test]
    fn total_count_matches_view_length_for_every_dimension_group() {
        let ds = dataset(vec![
            record("Sunny", "Low", "van", "Urban", "Toys", 30.0),
            record("Sunny", "Jam", "van", "Urban", "Books", 50.0),
            record("Fog", "Jam", "scooter", "Semi-Urban", "Books", 70.0),
        ]);
        let summary = summarize(&ds, &[0, 1, 2]);
        assert_eq!(summary.kpis.total_count, 3);
        for dim in Dimension::ALL {
            let rows: usize = summary.group_mean(dim).map(|(_, s)| s.count).sum();
            assert_eq!(rows, 3, "{dim}");
        }
        let traffic: Vec<_> = summary.group_mean(Dimension::Traffic).collect();
        assert_eq!(traffic[0].0, "Jam");
        assert_eq!(traffic[0].1.mean, Some(60.0));
    }

    #[test]
    fn null_times_count_as_rows_but_not_in_means() {
        let mut recs = vec![weather_record("Sunny", 20.0), weather_record("Fog", 0.0)];
        recs[1].delivery_time = None;
        let ds = dataset(recs);
        let summary = summarize(&ds, &[0, 1]);
        assert_eq!(summary.kpis.total_count, 2);
        assert_eq!(summary.kpis.avg_delivery_time, Some(20.0));
        assert_eq!(summary.kpis.percent_late, Some(0.0));
        let fog = summary
            .group_mean(Dimension::Weather)
            .find(|(k, _)| *k == "Fog")
            .map(|(_, s)| *s);
        assert_eq!(fog, Some(GroupStat { count: 1, mean: None }));
    }

    #[test]
    fn box_summary_marks_outliers() {
        let b = BoxSummary::from_values(vec![1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(b.q1, 2.0);
        assert_eq!(b.median, 3.0);
        assert_eq!(b.q3, 4.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.count, 5);
        assert!(BoxSummary::from_values(Vec::new()).is_none());
    }

    #[test]
    fn agent_points_skip_incomplete_rows() {
        let mut recs = vec![weather_record("Sunny", 20.0), weather_record("Fog", 30.0)];
        recs[1].agent_age = None;
        let ds = dataset(recs);
        let pts = agent_points(&ds, &[0, 1]);
        assert_eq!(
            pts,
            vec![AgentPoint {
                rating: 4.5,
                delivery_time: 20.0,
                age: 30.0
            }]
        );
    }
}
