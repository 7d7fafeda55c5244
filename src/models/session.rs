use serde::{Deserialize, Serialize};

/// One naturally completed focus session. Manual stops never produce one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetric {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub preset_used: String,
    pub duration_minutes: f64,
    pub completed: bool,
    /// Completion time in unix milliseconds.
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
    #[serde(default)]
    pub stress_level: u8,
}
