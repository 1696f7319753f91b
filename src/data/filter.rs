use std::collections::{BTreeMap, BTreeSet};

use super::model::{DeliveryDataset, DeliveryRecord, Dimension};

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Per-dimension selection state: maps dimension → set of selected values.
/// If a dimension is absent or its set is empty, it means "no filter" (show all).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterSelection {
    /// Selection that restricts nothing.
    pub fn all() -> Self {
        Self::default()
    }

    /// Builder-style helper: restrict `dim` to `values`.
    pub fn with<I, S>(mut self, dim: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected
            .insert(dim, values.into_iter().map(Into::into).collect());
        self
    }

    /// Selected values for a dimension (empty = unrestricted).
    pub fn values(&self, dim: Dimension) -> impl Iterator<Item = &str> {
        self.selected
            .get(&dim)
            .into_iter()
            .flat_map(|vals| vals.iter().map(String::as_str))
    }

    pub fn is_selected(&self, dim: Dimension, value: &str) -> bool {
        self.selected
            .get(&dim)
            .is_some_and(|vals| vals.contains(value))
    }

    /// Whether a dimension currently constrains anything.
    pub fn is_active(&self, dim: Dimension) -> bool {
        self.selected.get(&dim).is_some_and(|vals| !vals.is_empty())
    }

    /// Number of selected values for a dimension.
    pub fn count(&self, dim: Dimension) -> usize {
        self.selected.get(&dim).map_or(0, BTreeSet::len)
    }

    /// Add `value` if absent, remove it otherwise.
    pub fn toggle(&mut self, dim: Dimension, value: &str) {
        let selected = self.selected.entry(dim).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Drop every restriction on `dim`.
    pub fn clear(&mut self, dim: Dimension) {
        self.selected.remove(&dim);
    }

    /// Drop every restriction.
    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// A record passes when, for every dimension with a non-empty selection,
    /// its value is one of the selected values.
    pub fn matches(&self, record: &DeliveryRecord) -> bool {
        self.selected
            .iter()
            .filter(|(_, vals)| !vals.is_empty())
            .all(|(dim, vals)| vals.contains(record.dimension_value(*dim)))
    }
}

/// Return indices of records that pass the selection, in dataset order.
pub fn filtered_indices(dataset: &DeliveryDataset, selection: &FilterSelection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Narrow an existing view further; equivalent to filtering the dataset with
/// both selections at once.
pub fn refine(
    dataset: &DeliveryDataset,
    view: &[usize],
    selection: &FilterSelection,
) -> Vec<usize> {
    view.iter()
        .copied()
        .filter(|&i| {
            dataset
                .records
                .get(i)
                .is_some_and(|rec| selection.matches(rec))
        })
        .collect()
}
