//! Null-handling strategy applied after windowing

use serde::{Deserialize, Serialize};

/// What to do with the nulls produced by window warm-up.
///
/// Training and serving disagree here on purpose: training can afford to drop
/// warm-up rows, a single inference row cannot be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Drop rows whose reference column (first key sensor, widest window) is null
    DropIncomplete,
    /// Backward fill within each unit, then replace what is left with 0.0
    BackfillThenZero,
}

impl NullPolicy {
    /// Policy used when building a training set
    pub fn training() -> Self {
        NullPolicy::DropIncomplete
    }

    /// Policy used when preparing rows for inference
    pub fn serving() -> Self {
        NullPolicy::BackfillThenZero
    }
}
