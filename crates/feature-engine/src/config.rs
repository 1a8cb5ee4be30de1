//! Feature configuration shared by every caller of the engine

use crate::FeatureError;
use sensor_frame::sensor_index;
use serde::{Deserialize, Serialize};

/// Sensor channels carrying degradation signal in FD001
pub const DEFAULT_KEY_SENSORS: [&str; 14] = [
    "s_2", "s_3", "s_4", "s_7", "s_8", "s_9", "s_11", "s_12", "s_13", "s_14", "s_15", "s_17",
    "s_20", "s_21",
];

/// Trailing rolling-mean window sizes (cycles)
pub const DEFAULT_WINDOWS: [usize; 2] = [5, 10];

/// Ordered set of sensor channels that receive derived features.
///
/// Changing the set invalidates every trained artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySensorSet {
    channels: Vec<String>,
}

impl KeySensorSet {
    /// Build a set from channel names, rejecting unknown or duplicate channels
    pub fn new<I, S>(channels: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in channels {
            let name = name.into();
            if sensor_index(&name).is_none() || out.contains(&name) {
                return Err(FeatureError::UnknownChannel(name));
            }
            out.push(name);
        }
        if out.is_empty() {
            return Err(FeatureError::EmptyKeySensors);
        }
        Ok(Self { channels: out })
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub(crate) fn first(&self) -> &str {
        &self.channels[0]
    }
}

impl Default for KeySensorSet {
    fn default() -> Self {
        Self {
            channels: DEFAULT_KEY_SENSORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Key sensors plus window sizes; the whole parameterisation of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub key_sensors: KeySensorSet,
    pub windows: Vec<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            key_sensors: KeySensorSet::default(),
            windows: DEFAULT_WINDOWS.to_vec(),
        }
    }
}

impl FeatureConfig {
    /// Check window sizes
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.key_sensors.is_empty() {
            return Err(FeatureError::EmptyKeySensors);
        }
        match self.windows.iter().find(|&&w| w == 0) {
            Some(&w) => Err(FeatureError::InvalidWindow(w)),
            None if self.windows.is_empty() => Err(FeatureError::InvalidWindow(0)),
            None => Ok(()),
        }
    }

    /// Names of the features derived for one channel, in output order
    pub fn derived_columns(&self, channel: &str) -> Vec<String> {
        let mut cols: Vec<String> = self
            .windows
            .iter()
            .map(|w| format!("{channel}_rolling_{w}"))
            .collect();
        cols.push(format!("{channel}_diff"));
        cols
    }

    /// Column whose nulls decide row removal in training
    pub fn reference_column(&self) -> String {
        let widest = self.windows.iter().copied().max().unwrap_or(1);
        format!("{}_rolling_{}", self.key_sensors.first(), widest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_sensors() {
        let set = KeySensorSet::default();
        assert_eq!(set.len(), 14);
        assert_eq!(set.channels()[0], "s_2");
        assert_eq!(set.channels()[13], "s_21");
    }

    #[test]
    fn test_rejects_unknown_channel() {
        assert_eq!(
            KeySensorSet::new(["s_2", "s_99"]),
            Err(FeatureError::UnknownChannel("s_99".to_string()))
        );
        assert_eq!(
            KeySensorSet::new(Vec::<String>::new()),
            Err(FeatureError::EmptyKeySensors)
        );
    }

    #[test]
    fn test_derived_and_reference_columns() {
        let config = FeatureConfig::default();
        assert_eq!(
            config.derived_columns("s_9"),
            vec!["s_9_rolling_5", "s_9_rolling_10", "s_9_diff"]
        );
        assert_eq!(config.reference_column(), "s_2_rolling_10");
    }

    #[test]
    fn test_zero_window_invalid() {
        let config = FeatureConfig {
            windows: vec![5, 0],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(FeatureError::InvalidWindow(0)));
    }
}
