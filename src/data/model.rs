use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// RawTable – what the loader hands to the cleaner
// ---------------------------------------------------------------------------

/// A parsed table before any typing: header names plus rows of optional cells.
/// `None` marks a missing value (empty cell, `NA`, `NaN`, JSON/Parquet null, …).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    /// Every row has exactly `headers.len()` cells.
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with missing cells and truncating long ones.
    pub fn push_row(&mut self, mut cells: Vec<Option<String>>) {
        cells.resize(self.headers.len(), None);
        self.rows.push(cells);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// Dimension – the five filterable categorical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Weather,
    Traffic,
    Vehicle,
    Area,
    Category,
}

impl Dimension {
    /// Display / iteration order used by the filter panel and the aggregates.
    pub const ALL: [Dimension; 5] = [
        Dimension::Weather,
        Dimension::Traffic,
        Dimension::Vehicle,
        Dimension::Area,
        Dimension::Category,
    ];

    /// Header name of the source column.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::Weather => "Weather",
            Dimension::Traffic => "Traffic",
            Dimension::Vehicle => "Vehicle",
            Dimension::Area => "Area",
            Dimension::Category => "Category",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

pub const DELIVERY_TIME: &str = "Delivery_Time";
pub const AGENT_AGE: &str = "Agent_Age";
pub const AGENT_RATING: &str = "Agent_Rating";

// ---------------------------------------------------------------------------
// DeliveryRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A single delivery (one row of the source table) after cleaning.
///
/// Numeric fields are `Option` because the lenient cleaning policy keeps rows
/// whose coercion failed. Under the strict policy they are always `Some`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRecord {
    /// Minutes from pickup to drop-off.
    pub delivery_time: Option<f64>,
    pub agent_age: Option<f64>,
    pub agent_rating: Option<f64>,
    pub weather: String,
    pub traffic: String,
    pub vehicle: String,
    pub area: String,
    pub category: String,
    /// Pass-through columns: column_name → cell text.
    pub extra: BTreeMap<String, String>,
    /// Derived once over the whole cleaned dataset, see [`super::late`].
    pub late: bool,
}

impl DeliveryRecord {
    /// Value of a filterable dimension for this record.
    pub fn dimension_value(&self, dim: Dimension) -> &str {
        match dim {
            Dimension::Weather => &self.weather,
            Dimension::Traffic => &self.traffic,
            Dimension::Vehicle => &self.vehicle,
            Dimension::Area => &self.area,
            Dimension::Category => &self.category,
        }
    }
}

// ---------------------------------------------------------------------------
// DeliveryDataset – the complete cleaned + flagged dataset
// ---------------------------------------------------------------------------

/// The cleaned, flagged dataset with pre-computed filter options.
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DeliveryDataset {
    pub records: Vec<DeliveryRecord>,
    /// Names of the pass-through columns, in source order.
    pub extra_columns: Vec<String>,
    /// `mean + stddev` of Delivery_Time, `None` when undefined.
    pub late_threshold: Option<f64>,
    /// For each dimension the sorted set of distinct values (filter options).
    pub options: BTreeMap<Dimension, BTreeSet<String>>,
}

impl DeliveryDataset {
    /// Build the option index from already flagged records.
    pub fn from_records(
        records: Vec<DeliveryRecord>,
        extra_columns: Vec<String>,
        late_threshold: Option<f64>,
    ) -> Self {
        let mut options: BTreeMap<Dimension, BTreeSet<String>> =
            Dimension::ALL.iter().map(|&d| (d, BTreeSet::new())).collect();

        for rec in &records {
            for dim in Dimension::ALL {
                if let Some(values) = options.get_mut(&dim) {
                    if !values.contains(rec.dimension_value(dim)) {
                        values.insert(rec.dimension_value(dim).to_string());
                    }
                }
            }
        }

        DeliveryDataset {
            records,
            extra_columns,
            late_threshold,
            options,
        }
    }

    /// Distinct values offered for a dimension.
    pub fn options_for(&self, dim: Dimension) -> impl Iterator<Item = &str> {
        self.options
            .get(&dim)
            .into_iter()
            .flat_map(|vals| vals.iter().map(String::as_str))
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Record with the given categorical values and delivery time; age 30, rating 4.5.
    pub fn record(
        weather: &str,
        traffic: &str,
        vehicle: &str,
        area: &str,
        category: &str,
        delivery_time: f64,
    ) -> DeliveryRecord {
        DeliveryRecord {
            delivery_time: Some(delivery_time),
            agent_age: Some(30.0),
            agent_rating: Some(4.5),
            weather: weather.into(),
            traffic: traffic.into(),
            vehicle: vehicle.into(),
            area: area.into(),
            category: category.into(),
            extra: BTreeMap::new(),
            late: false,
        }
    }

    pub fn weather_record(weather: &str, delivery_time: f64) -> DeliveryRecord {
        record(weather, "Low", "motorcycle", "Urban", "Grocery", delivery_time)
    }

    pub fn dataset(records: Vec<DeliveryRecord>) -> DeliveryDataset {
        DeliveryDataset::from_records(records, Vec::new(), None)
    }
}
