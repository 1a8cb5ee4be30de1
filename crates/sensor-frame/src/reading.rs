//! Raw Reading Types

use serde::{Deserialize, Serialize};

/// Number of operating settings per row
pub const SETTING_COUNT: usize = 3;

/// Number of sensor channels per row
pub const SENSOR_COUNT: usize = 21;

/// Fixed width of a raw row: unit id, cycle, settings, sensors
pub const RAW_COLUMN_COUNT: usize = 2 + SETTING_COUNT + SENSOR_COUNT;

/// One cycle of one unit as read from a raw data file.
///
/// Settings and sensors are `None` when the source carried an explicit null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub unit_id: u32,
    pub cycle: u32,
    pub settings: [Option<f64>; SETTING_COUNT],
    pub sensors: [Option<f64>; SENSOR_COUNT],
}

impl RawReading {
    /// Create a reading with every channel set
    pub fn new(
        unit_id: u32,
        cycle: u32,
        settings: [f64; SETTING_COUNT],
        sensors: [f64; SENSOR_COUNT],
    ) -> Self {
        Self {
            unit_id,
            cycle,
            settings: settings.map(Some),
            sensors: sensors.map(Some),
        }
    }

    /// Sensor value by 1-based channel number (`s_1` is channel 1)
    pub fn sensor(&self, channel: usize) -> Option<f64> {
        channel
            .checked_sub(1)
            .and_then(|i| self.sensors.get(i).copied().flatten())
    }

    /// Look up a setting or sensor by its canonical column name
    pub fn value(&self, column: &str) -> Option<f64> {
        if let Some(i) = setting_index(column) {
            return self.settings[i];
        }
        sensor_index(column).and_then(|i| self.sensors[i])
    }
}

/// Canonical column names in raw file order
pub fn column_names() -> Vec<String> {
    let mut names = vec!["unit_id".to_string(), "cycle".to_string()];
    names.extend((1..=SETTING_COUNT).map(|i| format!("setting_{i}")));
    names.extend((1..=SENSOR_COUNT).map(|i| format!("s_{i}")));
    names
}

/// Zero-based sensor slot for a name like `s_7`
pub fn sensor_index(name: &str) -> Option<usize> {
    let n: usize = name.strip_prefix("s_")?.parse().ok()?;
    (1..=SENSOR_COUNT).contains(&n).then(|| n - 1)
}

/// Zero-based setting slot for a name like `setting_2`
pub fn setting_index(name: &str) -> Option<usize> {
    let n: usize = name.strip_prefix("setting_")?.parse().ok()?;
    (1..=SETTING_COUNT).contains(&n).then(|| n - 1)
}
