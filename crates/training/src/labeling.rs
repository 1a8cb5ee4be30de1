//! RUL Target Labeling

use feature_engine::FeatureTable;
use sensor_frame::RawReading;
use std::collections::HashMap;

/// Ceiling applied to the regression target (cycles)
pub const MAX_RUL: u32 = 125;

/// Last observed cycle of every unit
pub fn last_cycles<I>(keys: I) -> HashMap<u32, u32>
where
    I: IntoIterator<Item = (u32, u32)>,
{
    let mut last: HashMap<u32, u32> = HashMap::new();
    for (unit, cycle) in keys {
        let entry = last.entry(unit).or_insert(cycle);
        *entry = (*entry).max(cycle);
    }
    last
}

/// Clipped remaining-useful-life label for every row.
///
/// `min(max cycle of the row's unit - cycle, max_rul)`, where the max is taken
/// over the rows passed in.
pub fn rul_labels(unit_ids: &[u32], cycles: &[u32], max_rul: u32) -> Vec<f64> {
    let last = last_cycles(unit_ids.iter().copied().zip(cycles.iter().copied()));
    label_rows(unit_ids, cycles, &last, max_rul)
}

/// Labels aligned with the rows of an engineered table.
///
/// Each unit's end of life comes from the raw `readings`, since the training
/// null policy may have dropped the unit's final rows from `table`.
pub fn attach_rul_labels(table: &FeatureTable, readings: &[RawReading], max_rul: u32) -> Vec<f64> {
    let last = last_cycles(readings.iter().map(|r| (r.unit_id, r.cycle)));
    label_rows(table.unit_ids(), table.cycles(), &last, max_rul)
}

fn label_rows(unit_ids: &[u32], cycles: &[u32], last: &HashMap<u32, u32>, max_rul: u32) -> Vec<f64> {
    unit_ids
        .iter()
        .zip(cycles)
        .map(|(unit, &cycle)| {
            let end = last.get(unit).copied().unwrap_or(cycle);
            end.saturating_sub(cycle).min(max_rul) as f64
        })
        .collect()
}
