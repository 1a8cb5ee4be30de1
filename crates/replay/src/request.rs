//! Request Construction from Engineered Rows

use feature_engine::FeatureTable;
use inference_engine::PredictRequest;
use serde_json::{Map, Value};

/// Package one engineered row; nulls and non-finite values become JSON null
pub fn row_request(table: &FeatureTable, row: usize) -> PredictRequest {
    let data: Map<String, Value> = table
        .row_entries(row)
        .into_iter()
        .map(|(name, value)| (name, value.map(Value::from).unwrap_or(Value::Null)))
        .collect();
    PredictRequest { data }
}

/// Requests for every row of one unit, tagged with their cycle, in cycle order
pub fn unit_requests(table: &FeatureTable, unit_id: u32) -> Vec<(u32, PredictRequest)> {
    let unit = table.select_unit(unit_id);
    let mut requests: Vec<(u32, PredictRequest)> = (0..unit.len())
        .map(|i| (unit.cycle(i), row_request(&unit, i)))
        .collect();
    requests.sort_by_key(|(cycle, _)| *cycle);
    requests
}
