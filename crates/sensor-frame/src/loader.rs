//! Whitespace-Delimited Row Parsing

use crate::error::FrameError;
use crate::reading::{column_names, RawReading, RAW_COLUMN_COUNT, SENSOR_COUNT, SETTING_COUNT};
use std::path::Path;
use tracing::{debug, info};

/// Tokens treated as an explicit null
const NULL_TOKENS: [&str; 4] = ["nan", "NaN", "null", "NA"];

/// Load and parse a raw data file
pub fn load_readings(path: impl AsRef<Path>) -> Result<Vec<RawReading>, FrameError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let readings = parse_readings(&text)?;
    info!(
        "Loaded {} rows from {} ({} units)",
        readings.len(),
        path.display(),
        count_units(&readings)
    );
    Ok(readings)
}

/// Parse raw rows, returning them ordered by (unit_id, cycle)
pub fn parse_readings(text: &str) -> Result<Vec<RawReading>, FrameError> {
    let names = column_names();
    let mut readings = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() < RAW_COLUMN_COUNT {
            return Err(FrameError::ColumnCount {
                line: line_no,
                expected: RAW_COLUMN_COUNT,
                found: tokens.len(),
            });
        }

        let unit_id = parse_id(tokens[0], "unit_id", line_no)?;
        let cycle = parse_id(tokens[1], "cycle", line_no)?;
        if cycle == 0 {
            return Err(FrameError::InvalidRow {
                line: line_no,
                reason: "cycle must be >= 1".to_string(),
            });
        }

        let mut settings = [None; SETTING_COUNT];
        for (i, slot) in settings.iter_mut().enumerate() {
            let col = 2 + i;
            *slot = parse_value(tokens[col], &names[col], line_no)?;
        }

        let mut sensors = [None; SENSOR_COUNT];
        for (i, slot) in sensors.iter_mut().enumerate() {
            let col = 2 + SETTING_COUNT + i;
            *slot = parse_value(tokens[col], &names[col], line_no)?;
        }

        readings.push(RawReading {
            unit_id,
            cycle,
            settings,
            sensors,
        });
    }

    // Stable: rows sharing a key keep file order
    readings.sort_by_key(|r| (r.unit_id, r.cycle));
    debug!("Parsed {} raw rows", readings.len());
    Ok(readings)
}

/// Load the single-column ground-truth RUL file (one value per test unit)
pub fn load_ground_truth(path: impl AsRef<Path>) -> Result<Vec<u32>, FrameError> {
    let path = path.as_ref();
    let text = read_to_string(path)?;
    let values = parse_ground_truth(&text)?;
    info!("Loaded {} ground-truth values from {}", values.len(), path.display());
    Ok(values)
}

/// Parse ground-truth RUL values in unit order
pub fn parse_ground_truth(text: &str) -> Result<Vec<u32>, FrameError> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        values.push(parse_id(token, "rul", idx + 1)?);
    }
    Ok(values)
}

fn read_to_string(path: &Path) -> Result<String, FrameError> {
    std::fs::read_to_string(path).map_err(|source| FrameError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn parse_id(token: &str, column: &str, line: usize) -> Result<u32, FrameError> {
    token.parse::<u32>().map_err(|_| FrameError::InvalidRow {
        line,
        reason: format!("{column} {token:?} is not a non-negative integer"),
    })
}

fn parse_value(token: &str, column: &str, line: usize) -> Result<Option<f64>, FrameError> {
    if NULL_TOKENS.contains(&token) {
        return Ok(None);
    }
    token
        .parse::<f64>()
        .map(Some)
        .map_err(|_| FrameError::TypeConversion {
            line,
            column: column.to_string(),
            value: token.to_string(),
        })
}

fn count_units(readings: &[RawReading]) -> usize {
    let mut units: Vec<u32> = readings.iter().map(|r| r.unit_id).collect();
    units.dedup();
    units.len()
}
