use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::models::SessionMetric;

use super::streak::StreakState;

pub const METRICS_FILE_NAME: &str = "vibe_metrics.json";

/// Durable home of the metrics record.
pub trait MetricsBackend: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
}

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl MetricsBackend for JsonFileBackend {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .with_context(|| format!("Failed to read metrics from {}", self.path.display()))
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create metrics directory {}", parent.display())
            })?;
        }
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write metrics to {}", self.path.display()))
    }
}

/// Process-local backend for tests and for running without a data directory.
#[derive(Default)]
pub struct MemoryBackend {
    contents: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl MetricsBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, contents: &str) -> Result<()> {
        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    pub streak_days: u32,
    pub last_focus_day: Option<String>,
    pub completed_sessions: u32,
    pub session_metrics: Vec<SessionMetric>,
}

impl MetricsRecord {
    pub fn streak(&self) -> StreakState {
        StreakState {
            streak_days: self.streak_days,
            last_focus_day: self.last_focus_day.clone(),
        }
    }
}

/// Parses a stored record, defaulting each field on its own. A corrupt session
/// entry is dropped without discarding its neighbours.
pub fn parse_record(contents: &str) -> MetricsRecord {
    let value: Value = match serde_json::from_str(contents) {
        Ok(value) => value,
        Err(err) => {
            warn!("Stored metrics are not valid JSON, using defaults: {err}");
            return MetricsRecord::default();
        }
    };

    let session_metrics = match value.get("sessionMetrics") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| decode_value::<SessionMetric>("sessionMetrics[]", item))
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!("Ignoring stored sessionMetrics of unexpected shape: {other}");
            Vec::new()
        }
    };

    MetricsRecord {
        streak_days: field(&value, "streakDays").unwrap_or_default(),
        last_focus_day: field::<String>(&value, "lastFocusDay").filter(|day| !day.is_empty()),
        completed_sessions: field(&value, "completedSessions").unwrap_or_default(),
        session_metrics,
    }
}

fn field<T: DeserializeOwned>(value: &Value, key: &str) -> Option<T> {
    match value.get(key) {
        None | Some(Value::Null) => None,
        Some(raw) => decode_value(key, raw),
    }
}

fn decode_value<T: DeserializeOwned>(key: &str, raw: &Value) -> Option<T> {
    match T::deserialize(raw) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("Ignoring malformed stored field {key}: {err}");
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    pub streak_days: u32,
    pub completed_sessions: u32,
    pub total_minutes: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsExport {
    pub exported_timestamp: String,
    pub stats: ExportStats,
    pub sessions: Vec<SessionMetric>,
}

impl MetricsExport {
    pub fn new(record: &MetricsRecord, exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_timestamp: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            stats: ExportStats {
                streak_days: record.streak_days,
                completed_sessions: record.completed_sessions,
                total_minutes: record
                    .session_metrics
                    .iter()
                    .map(|session| session.duration_minutes)
                    .sum(),
            },
            sessions: record.session_metrics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metric(minutes: f64) -> Value {
        json!({
            "date": "2024-03-10",
            "presetUsed": "Bug Hunt Mode",
            "durationMinutes": minutes,
            "completed": true,
            "timestamp": 1_710_061_200_000_i64,
            "stressLevel": 75
        })
    }

    #[test]
    fn well_formed_record_parses() {
        let raw = json!({
            "streakDays": 4,
            "lastFocusDay": "2024-03-10",
            "completedSessions": 9,
            "sessionMetrics": [metric(45.0)]
        });
        let record = parse_record(&raw.to_string());
        assert_eq!(record.streak_days, 4);
        assert_eq!(record.last_focus_day.as_deref(), Some("2024-03-10"));
        assert_eq!(record.completed_sessions, 9);
        assert_eq!(record.session_metrics.len(), 1);
        assert_eq!(record.session_metrics[0].duration_minutes, 45.0);
    }

    #[test]
    fn each_field_defaults_independently() {
        let raw = json!({
            "streakDays": "lots",
            "lastFocusDay": "2024-03-10",
            "completedSessions": -3,
            "sessionMetrics": [metric(30.0), {"date": 12}, metric(15.0)]
        });
        let record = parse_record(&raw.to_string());
        assert_eq!(record.streak_days, 0);
        assert_eq!(record.last_focus_day.as_deref(), Some("2024-03-10"));
        assert_eq!(record.completed_sessions, 0);
        assert_eq!(record.session_metrics.len(), 2);
    }

    #[test]
    fn garbage_yields_defaults() {
        assert_eq!(parse_record("{not json"), MetricsRecord::default());
        assert_eq!(parse_record("[1, 2, 3]"), MetricsRecord::default());
        let empty_day = parse_record(r#"{"lastFocusDay": ""}"#);
        assert_eq!(empty_day.last_focus_day, None);
    }

    #[test]
    fn export_sums_minutes() {
        let record = MetricsRecord {
            streak_days: 2,
            last_focus_day: Some("2024-03-10".into()),
            completed_sessions: 2,
            session_metrics: vec![
                serde_json::from_value(metric(45.0)).unwrap(),
                serde_json::from_value(metric(20.0)).unwrap(),
            ],
        };
        let exported_at = DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let export = MetricsExport::new(&record, exported_at);
        assert_eq!(export.stats.total_minutes, 65.0);
        assert_eq!(export.sessions.len(), 2);

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value["exportedTimestamp"], "2024-03-10T12:00:00.000Z");
        assert_eq!(value["stats"]["completedSessions"], 2);
    }

    #[test]
    fn file_backend_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested").join(METRICS_FILE_NAME));
        assert!(backend.read().unwrap().is_none());
        backend.write("{\"streakDays\":1}").unwrap();
        assert_eq!(backend.read().unwrap().as_deref(), Some("{\"streakDays\":1}"));
    }
}
