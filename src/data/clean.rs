use std::collections::BTreeMap;

use super::error::DataError;
use super::model::{
    DeliveryRecord, Dimension, RawTable, AGENT_AGE, AGENT_RATING, DELIVERY_TIME,
};

// ---------------------------------------------------------------------------
// Cleaning policy
// ---------------------------------------------------------------------------

/// What happens to a complete row whose numeric cell fails coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NumericPolicy {
    /// Drop the row, so every record has all three numeric fields.
    #[default]
    Strict,
    /// Keep the row with a null field; statistics skip it.
    Lenient,
}

/// Cleaned rows plus bookkeeping for the startup log.
#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    pub records: Vec<DeliveryRecord>,
    pub extra_columns: Vec<String>,
    /// Rows removed because some cell was missing.
    pub dropped_incomplete: usize,
    /// Complete rows with at least one numeric cell that failed coercion.
    pub uncoercible: usize,
}

/// Column positions of the required fields in a [`RawTable`].
struct Layout {
    delivery_time: usize,
    agent_age: usize,
    agent_rating: usize,
    dims: [usize; 5],
    extra: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(table: &RawTable) -> Result<Self, DataError> {
        let find = |name: &'static str| {
            table
                .column_index(name)
                .ok_or(DataError::MissingColumn(name))
        };

        let delivery_time = find(DELIVERY_TIME)?;
        let agent_age = find(AGENT_AGE)?;
        let agent_rating = find(AGENT_RATING)?;
        let mut dims = [0usize; 5];
        for (slot, dim) in dims.iter_mut().zip(Dimension::ALL) {
            *slot = find(dim.column_name())?;
        }

        let known = [delivery_time, agent_age, agent_rating];
        let extra = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(i, _)| !known.contains(i) && !dims.contains(i))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        Ok(Layout {
            delivery_time,
            agent_age,
            agent_rating,
            dims,
            extra,
        })
    }
}

// ---------------------------------------------------------------------------
// Cleaner
// ---------------------------------------------------------------------------

/// Parse a numeric cell; anything that is not a finite number becomes `None`.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turn a raw table into typed delivery records.
///
/// Completeness is checked first over the raw cells of every column: a row with
/// any missing cell is removed. The three numeric columns are then coerced;
/// rows where that fails are dropped or kept per `policy`.
pub fn clean(table: &RawTable, policy: NumericPolicy) -> Result<CleanedTable, DataError> {
    let layout = Layout::resolve(table)?;
    let mut out = CleanedTable {
        records: Vec::with_capacity(table.rows().len()),
        extra_columns: layout.extra.iter().map(|(_, h)| h.clone()).collect(),
        ..CleanedTable::default()
    };

    for (row_no, row) in table.rows().iter().enumerate() {
        let Some(cells) = row.iter().cloned().collect::<Option<Vec<String>>>() else {
            out.dropped_incomplete += 1;
            continue;
        };

        let delivery_time = coerce_numeric(&cells[layout.delivery_time]);
        let agent_age = coerce_numeric(&cells[layout.agent_age]);
        let agent_rating = coerce_numeric(&cells[layout.agent_rating]);

        if delivery_time.is_none() || agent_age.is_none() || agent_rating.is_none() {
            out.uncoercible += 1;
            log::debug!("row {row_no}: non-numeric value in a numeric column");
            if policy == NumericPolicy::Strict {
                continue;
            }
        }

        let [weather, traffic, vehicle, area, category] =
            layout.dims.map(|i| cells[i].clone());
        let extra: BTreeMap<String, String> = layout
            .extra
            .iter()
            .map(|(i, name)| (name.clone(), cells[*i].clone()))
            .collect();

        out.records.push(DeliveryRecord {
            delivery_time,
            agent_age,
            agent_rating,
            weather,
            traffic,
            vehicle,
            area,
            category,
            extra,
            late: false,
        });
    }

    if out.dropped_incomplete > 0 {
        log::warn!("Dropped {} incomplete rows", out.dropped_incomplete);
    }
    if out.uncoercible > 0 {
        match policy {
            NumericPolicy::Strict => {
                log::warn!("Dropped {} rows with non-numeric values", out.uncoercible)
            }
            NumericPolicy::Lenient => log::warn!(
                "Kept {} rows with non-numeric values as nulls",
                out.uncoercible
            ),
        }
    }

    Ok(out)
}
