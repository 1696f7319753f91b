use super::model::DeliveryRecord;
use super::stats;

/// Late-delivery threshold: `mean + sample stddev` of every non-null
/// Delivery_Time. `None` when fewer than two values are available.
pub fn late_threshold(records: &[DeliveryRecord]) -> Option<f64> {
    let times: Vec<f64> = records.iter().filter_map(|r| r.delivery_time).collect();
    let mean = stats::mean(times.iter().copied())?;
    let std_dev = stats::sample_std_dev(&times)?;
    Some(mean + std_dev)
}

/// Set `late` on every record against the threshold of the whole slice and
/// return that threshold.
///
/// Strictly greater than the threshold is late. Without a threshold, or
/// without a delivery time, a record is never late.
pub fn flag_late(records: &mut [DeliveryRecord]) -> Option<f64> {
    let threshold = late_threshold(records);
    for rec in records.iter_mut() {
        rec.late = match (rec.delivery_time, threshold) {
            (Some(t), Some(limit)) => t > limit,
            _ => false,
        };
    }

    match threshold {
        Some(limit) => log::info!(
            "Late threshold {limit:.2} min, {} of {} deliveries late",
            records.iter().filter(|r| r.late).count(),
            records.len()
        ),
        None => log::warn!("Late threshold undefined (fewer than two delivery times)"),
    }
    threshold
}
