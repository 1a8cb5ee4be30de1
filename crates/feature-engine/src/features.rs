//! Feature Table Assembly

use crate::config::FeatureConfig;
use crate::policy::NullPolicy;
use crate::statistics::{backfill, first_difference, rolling_mean};
use crate::FeatureError;
use sensor_frame::{sensor_index, RawReading, SENSOR_COUNT, SETTING_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Engineered rows in input order.
///
/// `values[i]` is aligned with `columns`: settings, raw sensors, then the
/// derived features of each key sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    columns: Vec<String>,
    unit_ids: Vec<u32>,
    cycles: Vec<u32>,
    values: Vec<Vec<Option<f64>>>,
}

impl FeatureTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn unit_id(&self, row: usize) -> u32 {
        self.unit_ids[row]
    }

    pub fn cycle(&self, row: usize) -> u32 {
        self.cycles[row]
    }

    pub fn unit_ids(&self) -> &[u32] {
        &self.unit_ids
    }

    pub fn cycles(&self) -> &[u32] {
        &self.cycles
    }

    /// Values of one row, aligned with [`FeatureTable::columns`]
    pub fn row(&self, row: usize) -> &[Option<f64>] {
        &self.values[row]
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// One row as (name, value) pairs, identifiers first
    pub fn row_entries(&self, row: usize) -> Vec<(String, Option<f64>)> {
        let mut entries = Vec::with_capacity(self.columns.len() + 2);
        entries.push(("unit_id".to_string(), Some(self.unit_ids[row] as f64)));
        entries.push(("cycle".to_string(), Some(self.cycles[row] as f64)));
        entries.extend(
            self.columns
                .iter()
                .cloned()
                .zip(self.values[row].iter().copied()),
        );
        entries
    }

    /// Keep only the rows of one unit
    pub fn select_unit(&self, unit_id: u32) -> FeatureTable {
        self.filter_rows(|t, i| t.unit_ids[i] == unit_id)
    }

    /// Keep rows matching a predicate on (table, row index)
    pub fn filter_rows<F>(&self, mut keep: F) -> FeatureTable
    where
        F: FnMut(&FeatureTable, usize) -> bool,
    {
        let mut out = FeatureTable {
            columns: self.columns.clone(),
            unit_ids: Vec::new(),
            cycles: Vec::new(),
            values: Vec::new(),
        };
        for i in 0..self.len() {
            if keep(self, i) {
                out.unit_ids.push(self.unit_ids[i]);
                out.cycles.push(self.cycles[i]);
                out.values.push(self.values[i].clone());
            }
        }
        out
    }

    /// Distinct unit ids in row order
    pub fn units(&self) -> Vec<u32> {
        let mut units = self.unit_ids.clone();
        units.dedup();
        units
    }
}

/// Feature engine that derives per-unit window features from raw readings
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    config: FeatureConfig,
}

impl FeatureEngine {
    /// Create a new engine, validating the configuration
    pub fn new(config: FeatureConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Output column names in order
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = (1..=SETTING_COUNT).map(|i| format!("setting_{i}")).collect();
        columns.extend((1..=SENSOR_COUNT).map(|i| format!("s_{i}")));
        for channel in self.config.key_sensors.channels() {
            columns.extend(self.config.derived_columns(channel));
        }
        columns
    }

    /// Derive features for readings ordered by (unit_id, cycle).
    ///
    /// Row count and order are preserved except for rows removed by
    /// [`NullPolicy::DropIncomplete`].
    pub fn engineer(
        &self,
        readings: &[RawReading],
        policy: NullPolicy,
    ) -> Result<FeatureTable, FeatureError> {
        check_order(readings)?;

        let columns = self.columns();
        let mut values: Vec<Vec<Option<f64>>> = readings
            .iter()
            .map(|r| {
                let mut row = Vec::with_capacity(columns.len());
                row.extend_from_slice(&r.settings);
                row.extend_from_slice(&r.sensors);
                row
            })
            .collect();

        let units = unit_ranges(readings);
        for range in &units {
            self.derive_unit(&readings[range.clone()], &mut values[range.clone()])?;
        }

        let mut table = FeatureTable {
            columns,
            unit_ids: readings.iter().map(|r| r.unit_id).collect(),
            cycles: readings.iter().map(|r| r.cycle).collect(),
            values,
        };

        match policy {
            NullPolicy::DropIncomplete => {
                let reference = self.config.reference_column();
                let idx = table
                    .column_index(&reference)
                    .ok_or(FeatureError::UnknownChannel(reference))?;
                table = table.filter_rows(|t, i| t.values[i][idx].is_some());
            }
            NullPolicy::BackfillThenZero => {
                for range in &units {
                    fill_unit(&mut table.values[range.clone()]);
                }
            }
        }

        debug!(
            "Engineered {} rows from {} readings across {} units ({:?})",
            table.len(),
            readings.len(),
            units.len(),
            policy
        );
        Ok(table)
    }

    /// Append derived columns for one unit's rows
    fn derive_unit(
        &self,
        readings: &[RawReading],
        rows: &mut [Vec<Option<f64>>],
    ) -> Result<(), FeatureError> {
        for channel in self.config.key_sensors.channels() {
            let slot = sensor_index(channel)
                .ok_or_else(|| FeatureError::UnknownChannel(channel.clone()))?;
            let series: Vec<Option<f64>> = readings.iter().map(|r| r.sensors[slot]).collect();

            let rolled: Vec<Vec<Option<f64>>> = self
                .config
                .windows
                .iter()
                .map(|&w| rolling_mean(&series, w))
                .collect();
            let diff = first_difference(&series);

            for (i, row) in rows.iter_mut().enumerate() {
                row.extend(rolled.iter().map(|r| r[i]));
                row.push(diff[i]);
            }
        }
        Ok(())
    }
}

/// Backward fill each column within one unit, then zero what remains
fn fill_unit(rows: &mut [Vec<Option<f64>>]) {
    let Some(width) = rows.first().map(|r| r.len()) else {
        return;
    };
    let mut column = Vec::with_capacity(rows.len());
    for c in 0..width {
        column.clear();
        column.extend(rows.iter().map(|r| r[c]));
        backfill(&mut column);
        for (row, v) in rows.iter_mut().zip(&column) {
            row[c] = Some(v.unwrap_or(0.0));
        }
    }
}

fn check_order(readings: &[RawReading]) -> Result<(), FeatureError> {
    for (i, pair) in readings.windows(2).enumerate() {
        if (pair[0].unit_id, pair[0].cycle) > (pair[1].unit_id, pair[1].cycle) {
            return Err(FeatureError::UnorderedInput { index: i + 1 });
        }
    }
    Ok(())
}

/// Contiguous index ranges sharing a unit id
fn unit_ranges(readings: &[RawReading]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=readings.len() {
        if i == readings.len() || readings[i].unit_id != readings[start].unit_id {
            ranges.push(start..i);
            start = i;
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Unit with `cycles` rows where every sensor reads `base + cycle`
    fn unit(unit_id: u32, cycles: u32, base: f64) -> Vec<RawReading> {
        (1..=cycles)
            .map(|c| {
                RawReading::new(
                    unit_id,
                    c,
                    [0.0, 0.0, 100.0],
                    [base + c as f64; SENSOR_COUNT],
                )
            })
            .collect()
    }

    fn value(table: &FeatureTable, row: usize, column: &str) -> Option<f64> {
        table.row(row)[table.column_index(column).unwrap()]
    }

    #[test]
    fn test_column_layout() {
        let engine = FeatureEngine::default();
        let columns = engine.columns();
        assert_eq!(columns.len(), 3 + 21 + 14 * 3);
        assert_eq!(columns[0], "setting_1");
        assert_eq!(columns[3], "s_1");
        assert_eq!(columns[24], "s_2_rolling_5");
        assert_eq!(columns[25], "s_2_rolling_10");
        assert_eq!(columns[26], "s_2_diff");
        assert_eq!(columns.last().unwrap(), "s_21_diff");
    }

    #[test]
    fn test_training_drops_first_nine_cycles() {
        let engine = FeatureEngine::default();
        let mut readings = unit(1, 15, 0.0);
        readings.extend(unit(2, 12, 100.0));

        let table = engine.engineer(&readings, NullPolicy::training()).unwrap();

        assert_eq!(table.len(), (15 - 9) + (12 - 9));
        assert_eq!(table.cycle(0), 10);
        assert_eq!(table.unit_id(6), 2);
        assert_eq!(table.cycle(6), 10);
        // mean of cycles 1..=10 for unit 1
        assert_eq!(value(&table, 0, "s_2_rolling_10"), Some(5.5));
        assert_eq!(value(&table, 0, "s_2_rolling_5"), Some(8.0));
        assert_eq!(value(&table, 0, "s_2_diff"), Some(1.0));
    }

    #[test]
    fn test_windows_reset_at_unit_boundary() {
        let engine = FeatureEngine::default();
        let mut readings = unit(1, 12, 0.0);
        readings.extend(unit(2, 12, 1000.0));

        let table = engine.engineer(&readings, NullPolicy::training()).unwrap();
        let first_unit2 = (0..table.len()).find(|&i| table.unit_id(i) == 2).unwrap();

        // Unit 2's first surviving row only sees unit 2 values (1001..=1010)
        assert_eq!(value(&table, first_unit2, "s_2_rolling_10"), Some(1005.5));
        assert_eq!(value(&table, first_unit2, "s_2_diff"), Some(1.0));
    }

    #[test]
    fn test_serving_fills_without_dropping() {
        let engine = FeatureEngine::default();
        let readings = unit(7, 12, 0.0);

        let table = engine.engineer(&readings, NullPolicy::serving()).unwrap();

        assert_eq!(table.len(), 12);
        for i in 0..table.len() {
            assert!(table.row(i).iter().all(|v| v.is_some()));
        }
        // First nine rolling_10 values backfilled from cycle 10
        assert_eq!(value(&table, 0, "s_2_rolling_10"), Some(5.5));
        assert_eq!(value(&table, 8, "s_2_rolling_10"), Some(5.5));
        assert_eq!(value(&table, 0, "s_2_rolling_5"), Some(3.0));
        assert_eq!(value(&table, 0, "s_2_diff"), Some(1.0));
    }

    #[test]
    fn test_serving_short_unit_falls_back_to_zero() {
        let engine = FeatureEngine::default();
        let mut readings = unit(1, 3, 0.0);
        readings.extend(unit(2, 12, 500.0));

        let table = engine.engineer(&readings, NullPolicy::serving()).unwrap();

        // Unit 1 never reaches a full window and must not borrow from unit 2
        assert_eq!(value(&table, 0, "s_2_rolling_10"), Some(0.0));
        assert_eq!(value(&table, 2, "s_2_rolling_5"), Some(0.0));
        assert_eq!(value(&table, 0, "s_2_diff"), Some(1.0));
    }

    #[test]
    fn test_training_all_short_units_is_empty() {
        let engine = FeatureEngine::default();
        let table = engine.engineer(&unit(1, 9, 0.0), NullPolicy::training()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_unordered_input_rejected() {
        let engine = FeatureEngine::default();
        let mut readings = unit(1, 3, 0.0);
        readings.swap(0, 2);
        assert_eq!(
            engine.engineer(&readings, NullPolicy::serving()),
            Err(FeatureError::UnorderedInput { index: 1 })
        );
    }

    #[test]
    fn test_row_entries_include_identifiers() {
        let engine = FeatureEngine::default();
        let table = engine.engineer(&unit(3, 10, 0.0), NullPolicy::serving()).unwrap();
        let entries = table.row_entries(4);
        assert_eq!(entries[0], ("unit_id".to_string(), Some(3.0)));
        assert_eq!(entries[1], ("cycle".to_string(), Some(5.0)));
        assert_eq!(entries.len(), table.columns().len() + 2);
    }

    #[test]
    fn test_select_unit() {
        let engine = FeatureEngine::default();
        let mut readings = unit(1, 10, 0.0);
        readings.extend(unit(2, 11, 0.0));
        let table = engine.engineer(&readings, NullPolicy::serving()).unwrap();

        let selected = table.select_unit(2);
        assert_eq!(selected.len(), 11);
        assert_eq!(selected.units(), vec![2]);
        assert!(selected.cycles().windows(2).all(|w| w[0] < w[1]));
    }

    fn arb_readings() -> impl Strategy<Value = Vec<RawReading>> {
        prop::collection::vec((1usize..25, -50.0f64..50.0), 1..6).prop_map(|units| {
            let mut readings = Vec::new();
            for (i, (len, base)) in units.into_iter().enumerate() {
                for c in 1..=len as u32 {
                    let mut sensors = [0.0; SENSOR_COUNT];
                    for (s, v) in sensors.iter_mut().enumerate() {
                        *v = base + (c as f64 * 0.37 + s as f64).sin();
                    }
                    readings.push(RawReading::new(i as u32 + 1, c, [0.0, 0.0, 100.0], sensors));
                }
            }
            readings
        })
    }

    proptest! {
        #[test]
        fn prop_training_drops_exactly_warmup(readings in arb_readings()) {
            let engine = FeatureEngine::default();
            let table = engine.engineer(&readings, NullPolicy::training()).unwrap();

            let mut expected = 0;
            let mut units = readings.iter().map(|r| r.unit_id).collect::<Vec<_>>();
            units.dedup();
            for u in units {
                let n = readings.iter().filter(|r| r.unit_id == u).count();
                expected += n.saturating_sub(9);
            }
            prop_assert_eq!(table.len(), expected);
            prop_assert!(table.cycles().iter().all(|&c| c >= 10));
        }

        #[test]
        fn prop_serving_has_no_nulls(readings in arb_readings()) {
            let engine = FeatureEngine::default();
            let table = engine.engineer(&readings, NullPolicy::serving()).unwrap();
            prop_assert_eq!(table.len(), readings.len());
            for i in 0..table.len() {
                prop_assert!(table.row(i).iter().all(|v| v.is_some()));
            }
        }

        #[test]
        fn prop_engineering_is_deterministic(readings in arb_readings()) {
            let engine = FeatureEngine::default();
            let a = engine.engineer(&readings, NullPolicy::serving()).unwrap();
            let b = engine.engineer(&readings, NullPolicy::serving()).unwrap();
            for i in 0..a.len() {
                let bits_a: Vec<_> = a.row(i).iter().map(|v| v.map(f64::to_bits)).collect();
                let bits_b: Vec<_> = b.row(i).iter().map(|v| v.map(f64::to_bits)).collect();
                prop_assert_eq!(bits_a, bits_b);
            }
        }

        #[test]
        fn prop_windows_match_unit_local_computation(readings in arb_readings()) {
            let engine = FeatureEngine::default();
            let table = engine.engineer(&readings, NullPolicy::training()).unwrap();
            let col = table.column_index("s_2_rolling_5").unwrap();
            for i in 0..table.len() {
                let (u, c) = (table.unit_id(i), table.cycle(i));
                let window: Vec<f64> = readings
                    .iter()
                    .filter(|r| r.unit_id == u && r.cycle + 5 > c && r.cycle <= c)
                    .map(|r| r.sensor(2).unwrap())
                    .collect();
                prop_assert_eq!(window.len(), 5);
                let mean = window.iter().sum::<f64>() / 5.0;
                prop_assert!((table.row(i)[col].unwrap() - mean).abs() < 1e-9);
            }
        }
    }
}
