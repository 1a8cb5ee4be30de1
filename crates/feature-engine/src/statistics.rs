//! Windowed statistics over a single unit's series
//!
//! Every function here works on one unit at a time. Callers split the input at
//! unit boundaries, which is what keeps windows from leaking across units.

/// Trailing arithmetic mean over `window` values.
///
/// A position is `None` until `window` values are available, and whenever any
/// value inside its window is `None`.
pub fn rolling_mean(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; series.len()];
    if window == 0 {
        return out;
    }
    for end in window - 1..series.len() {
        let slice = &series[end + 1 - window..=end];
        let mut sum = 0.0;
        let mut complete = true;
        for v in slice {
            match v {
                Some(x) => sum += x,
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            out[end] = Some(sum / window as f64);
        }
    }
    out
}

/// Value minus the previous value; `None` for the first position
pub fn first_difference(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    out.push(None);
    for pair in series.windows(2) {
        out.push(match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        });
    }
    out.truncate(series.len());
    out
}

/// Fill each `None` with the next non-null value after it
pub fn backfill(series: &mut [Option<f64>]) {
    let mut next = None;
    for v in series.iter_mut().rev() {
        match v {
            Some(x) => next = Some(*x),
            None => *v = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_rolling_mean_warmup() {
        let out = rolling_mean(&some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), 5);
        assert_eq!(out[..4], [None, None, None, None]);
        assert!((out[4].unwrap() - 3.0).abs() < 1e-12);
        assert!((out[5].unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_mean_null_in_window() {
        let mut series = some(&[1.0, 2.0, 3.0, 4.0]);
        series[1] = None;
        let out = rolling_mean(&series, 2);
        assert_eq!(out, vec![None, None, None, Some(3.5)]);
    }

    #[test]
    fn test_first_difference() {
        let out = first_difference(&some(&[10.0, 12.5, 12.0]));
        assert_eq!(out, vec![None, Some(2.5), Some(-0.5)]);
        assert!(first_difference(&[]).is_empty());
    }

    #[test]
    fn test_backfill_leaves_trailing_nulls() {
        let mut series = vec![None, None, Some(3.0), None, Some(5.0), None];
        backfill(&mut series);
        assert_eq!(
            series,
            vec![Some(3.0), Some(3.0), Some(3.0), Some(5.0), Some(5.0), None]
        );
    }

    proptest! {
        #[test]
        fn prop_rolling_defined_after_warmup(
            values in prop::collection::vec(-1000.0f64..1000.0, 0..40),
            window in 1usize..12,
        ) {
            let out = rolling_mean(&some(&values), window);
            prop_assert_eq!(out.len(), values.len());
            for (i, v) in out.iter().enumerate() {
                prop_assert_eq!(v.is_some(), i + 1 >= window);
            }
        }

        #[test]
        fn prop_diff_reconstructs_series(values in prop::collection::vec(-1000.0f64..1000.0, 1..40)) {
            let diffs = first_difference(&some(&values));
            for i in 1..values.len() {
                let rebuilt = values[i - 1] + diffs[i].unwrap();
                prop_assert!((rebuilt - values[i]).abs() < 1e-9);
            }
        }
    }
}
