//! Deterministic Train/Validation Split

use feature_engine::FeatureTable;
use tracing::debug;

/// Units up to and including this id train, the rest validate
pub const DEFAULT_SPLIT_UNIT: u32 = 80;

/// Row indices of each side of a unit split
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSplit {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Partition rows by unit id without shuffling.
///
/// Every row of a unit lands on the same side, so no unit leaks across.
pub fn split_by_unit(table: &FeatureTable, last_train_unit: u32) -> UnitSplit {
    let mut split = UnitSplit::default();
    for (i, &unit) in table.unit_ids().iter().enumerate() {
        if unit <= last_train_unit {
            split.train.push(i);
        } else {
            split.validation.push(i);
        }
    }
    debug!(
        "Split {} rows at unit {}: {} train, {} validation",
        table.len(),
        last_train_unit,
        split.train.len(),
        split.validation.len()
    );
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FeatureEngine, NullPolicy};
    use proptest::prelude::*;
    use sensor_frame::RawReading;

    fn table(units: &[(u32, u32)]) -> FeatureTable {
        let readings: Vec<RawReading> = units
            .iter()
            .flat_map(|&(unit, len)| {
                (1..=len).map(move |c| RawReading::new(unit, c, [0.0; 3], [c as f64; 21]))
            })
            .collect();
        FeatureEngine::default()
            .engineer(&readings, NullPolicy::serving())
            .unwrap()
    }

    #[test]
    fn test_boundary_unit_trains() {
        let t = table(&[(79, 2), (80, 2), (81, 2)]);
        let split = split_by_unit(&t, DEFAULT_SPLIT_UNIT);

        assert_eq!(split.train, vec![0, 1, 2, 3]);
        assert_eq!(split.validation, vec![4, 5]);
    }

    proptest! {
        #[test]
        fn prop_split_is_partition(
            units in proptest::collection::btree_set(1u32..120, 1..8),
            threshold in 0u32..130,
        ) {
            let layout: Vec<(u32, u32)> = units.iter().map(|&u| (u, 3)).collect();
            let t = table(&layout);
            let split = split_by_unit(&t, threshold);

            prop_assert_eq!(split.train.len() + split.validation.len(), t.len());
            for &i in &split.train {
                prop_assert!(t.unit_id(i) <= threshold);
            }
            for &i in &split.validation {
                prop_assert!(t.unit_id(i) > threshold);
            }
        }
    }
}
