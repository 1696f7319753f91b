//! Data layer: loading, cleaning, flagging, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → RawTable (optional text cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  clean   │  drop incomplete rows, coerce numeric columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   late   │  mean + stddev threshold → Late flag (once)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────────┐
//!   │ DeliveryDataset │  immutable records + filter options
//!   └─────────────────┘
//!        │   (every filter change)
//!        ▼
//!   ┌──────────┐      ┌───────────┐
//!   │  filter  │ ───▶ │ aggregate │  KPIs, group means, chart inputs
//!   └──────────┘      └───────────┘
//! ```
use std::path::Path;

use anyhow::{Context, Result};

pub mod aggregate;
pub mod clean;
pub mod error;
pub mod filter;
pub mod late;
pub mod loader;
pub mod model;
pub mod stats;

use clean::NumericPolicy;
use error::DataError;
use model::{DeliveryDataset, RawTable};

/// Clean and flag a raw table into the session dataset.
pub fn prepare(raw: &RawTable, policy: NumericPolicy) -> Result<DeliveryDataset, DataError> {
    let cleaned = clean::clean(raw, policy)?;
    let mut records = cleaned.records;
    let threshold = late::flag_late(&mut records);
    Ok(DeliveryDataset::from_records(
        records,
        cleaned.extra_columns,
        threshold,
    ))
}

/// Load the file at `path` and run the full preparation pipeline.
pub fn load_dataset(path: &Path, policy: NumericPolicy) -> Result<DeliveryDataset> {
    let raw = loader::load_file(path)
        .with_context(|| format!("loading delivery data from {}", path.display()))?;
    let dataset = prepare(&raw, policy)
        .with_context(|| format!("preparing delivery data from {}", path.display()))?;
    log::info!(
        "Prepared {} deliveries from {} raw rows (policy {:?})",
        dataset.len(),
        raw.rows().len(),
        policy
    );
    Ok(dataset)
}
