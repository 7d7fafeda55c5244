use std::path::PathBuf;

pub const DEFAULT_FPS: u32 = 60;
pub const MAX_FPS: u32 = 240;
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:3000";
const APP_DIR_NAME: &str = "vibeflow";

/// Runtime configuration, read once at startup from `VIBEFLOW_*` variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub debug: bool,
    pub fps: u32,
    pub audio_enabled: bool,
    pub share_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup("VIBEFLOW_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let fps = lookup("VIBEFLOW_FPS")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_FPS)
            .clamp(1, MAX_FPS);

        let share_origin = lookup("VIBEFLOW_SHARE_ORIGIN")
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .unwrap_or_else(|| DEFAULT_SHARE_ORIGIN.to_string());

        Self {
            data_dir,
            debug: is_truthy(lookup("VIBEFLOW_DEBUG")),
            fps,
            audio_enabled: !is_truthy(lookup("VIBEFLOW_NO_AUDIO")),
            share_origin,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(crate::settings::SETTINGS_FILE_NAME)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.data_dir.join(crate::store::persistence::METRICS_FILE_NAME)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

fn is_truthy(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert_eq!(config.fps, 60);
        assert!(!config.debug);
        assert!(config.audio_enabled);
        assert_eq!(config.share_origin, "http://localhost:3000");
        assert!(config.data_dir.ends_with("vibeflow"));
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("VIBEFLOW_DATA_DIR", "/tmp/vibes"),
            ("VIBEFLOW_DEBUG", "TRUE"),
            ("VIBEFLOW_FPS", "1000"),
            ("VIBEFLOW_NO_AUDIO", "1"),
            ("VIBEFLOW_SHARE_ORIGIN", "https://vibe.example/"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/vibes"));
        assert!(config.debug);
        assert_eq!(config.fps, 240);
        assert!(!config.audio_enabled);
        assert_eq!(config.share_origin, "https://vibe.example");
        assert_eq!(config.metrics_path(), PathBuf::from("/tmp/vibes/vibe_metrics.json"));
        assert_eq!(config.settings_path(), PathBuf::from("/tmp/vibes/settings.json"));
    }

    #[test]
    fn bad_fps_falls_back() {
        assert_eq!(config(&[("VIBEFLOW_FPS", "fast")]).fps, 60);
        assert_eq!(config(&[("VIBEFLOW_FPS", "0")]).fps, 1);
    }
}
