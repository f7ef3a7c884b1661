use serde::{Deserialize, Serialize};

/// Query parameter carrying each applied player (repeated once per player).
pub const SELECTED_PLAYERS_PARAM: &str = "selected_players";
/// Query parameter carrying the applied statistic.
pub const STAT_PARAM: &str = "stat";

pub const GRAPH_DATA_PATH: &str = "/api/graph-data";
pub const REFRESH_DATA_PATH: &str = "/refresh-data";

/// One line series as the charting library consumes it.
///
/// Styling keys (`borderColor`, `fill`, ...) are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    #[serde(default)]
    pub data: Vec<Option<f64>>,
    #[serde(flatten)]
    pub style: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET /api/graph-data` as received on the wire.
///
/// `labels` is optional here only so its absence can be reported as a distinct failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDataResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub datasets: Vec<ChartDataset>,
}

/// Validated chart series: one label per x position plus the datasets drawn over them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<Vec<String>>,
}
