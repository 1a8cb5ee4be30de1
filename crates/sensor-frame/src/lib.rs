//! Sensor Frame Loader
//!
//! Parses raw C-MAPSS style rows (unit id, cycle, 3 operating settings and
//! 21 sensor channels) into typed readings ordered by unit and cycle.

mod error;
mod loader;
mod reading;

pub use error::FrameError;
pub use loader::{load_ground_truth, load_readings, parse_ground_truth, parse_readings};
pub use reading::{
    column_names, sensor_index, setting_index, RawReading, RAW_COLUMN_COUNT, SENSOR_COUNT,
    SETTING_COUNT,
};
