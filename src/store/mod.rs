pub mod history;
pub mod persistence;
pub mod streak;

pub use history::{History, HISTORY_CAPACITY};
pub use persistence::{
    JsonFileBackend, MemoryBackend, MetricsBackend, MetricsExport, MetricsRecord,
};
pub use streak::StreakState;

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use log::{info, warn};
use tokio::sync::watch;

use crate::{
    clock::{format_day, Clock},
    models::{FeatureFlag, FeatureFlags, HistoryEntry, SessionMetric, ToolHint, ToolHints},
    timer::TimerState,
    vibe::{
        catalog, Ambience, AmbiencePatch, PresetId, SessionPreset, ThemeMode, VibeDescriptor,
        VibePatch,
    },
};

/// Observable state of a running session. Everything the timer, audio and
/// animation loops read lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    pub current_vibe: VibeDescriptor,
    pub history: History,
    pub is_thinking: bool,
    pub timer: TimerState,
    pub is_immersive: bool,
    pub is_music_active: bool,
    pub theme_mode: ThemeMode,
    pub is_binaural_enabled: bool,
    pub ambience: Ambience,
    pub key_sounds_enabled: bool,
    pub breath_mode_active: bool,
    pub streak: StreakState,
    pub completed_sessions: u32,
    pub session_metrics: Vec<SessionMetric>,
    pub feature_flags: FeatureFlags,
    pub tool_hints: ToolHints,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            current_vibe: catalog::default_vibe(),
            history: History::default(),
            is_thinking: false,
            timer: TimerState::new(),
            is_immersive: false,
            is_music_active: false,
            theme_mode: ThemeMode::default(),
            is_binaural_enabled: false,
            ambience: Ambience::default(),
            key_sounds_enabled: false,
            breath_mode_active: false,
            streak: StreakState::default(),
            completed_sessions: 0,
            session_metrics: Vec::new(),
            feature_flags: FeatureFlags::default(),
            tool_hints: ToolHints::default(),
        }
    }
}

/// The single owner of vibe, timer, toggle and metrics state. Every mutation
/// runs to completion before the next one starts.
pub struct VibeStore {
    state: StoreState,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn MetricsBackend>,
}

impl VibeStore {
    pub fn new(clock: Arc<dyn Clock>, backend: Arc<dyn MetricsBackend>) -> Self {
        Self {
            state: StoreState::default(),
            clock,
            backend,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn current_vibe(&self) -> &VibeDescriptor {
        &self.state.current_vibe
    }

    pub fn timer(&self) -> TimerState {
        self.state.timer
    }

    pub fn set_thinking(&mut self, thinking: bool) {
        self.state.is_thinking = thinking;
    }

    pub fn set_vibe_partial(&mut self, patch: VibePatch) {
        self.state.current_vibe.apply_patch(patch);
    }

    /// Replaces the vibe wholesale. Catalog membership is not required.
    pub fn set_vibe_absolute(&mut self, vibe: VibeDescriptor) {
        self.state.current_vibe = vibe;
    }

    pub fn add_history_entry(&mut self, trigger_text: &str, vibe_name: &str) {
        let entry = HistoryEntry {
            time: self.clock.local_time_label(),
            vibe_name: vibe_name.to_string(),
            trigger_text: trigger_text.to_string(),
            snapshot: self.state.current_vibe.clone(),
        };
        self.state.history.push(entry);
    }

    /// Restores the snapshot at `index`. Out-of-range indices are ignored.
    pub fn restore_history_index(&mut self, index: usize) -> bool {
        match self.state.history.get(index) {
            Some(entry) => {
                self.state.current_vibe = entry.snapshot.clone();
                true
            }
            None => false,
        }
    }

    pub fn start_timer(&mut self, minutes: u32) {
        self.state.timer = TimerState::started(minutes);
    }

    /// Returns true when this tick expired the timer.
    pub fn tick(&mut self) -> bool {
        self.state.timer.tick()
    }

    pub fn stop_timer(&mut self) {
        self.state.timer.stop();
    }

    /// Books a naturally finished session: streak, counters, metric, persistence.
    pub fn mark_session_complete(&mut self) {
        let now = self.clock.now();
        let today = format_day(self.clock.today());
        self.state.streak.record_focus_day(&today);
        self.state.completed_sessions = self.state.completed_sessions.saturating_add(1);

        let metric = SessionMetric {
            date: today,
            preset_used: self.state.current_vibe.name.clone(),
            duration_minutes: f64::from(self.state.timer.duration()) / 60.0,
            completed: true,
            timestamp_millis: now.timestamp_millis(),
            stress_level: self.state.current_vibe.stress_level,
        };
        info!(
            "Session complete: {} ({} min), streak {} day(s)",
            metric.preset_used, metric.duration_minutes, self.state.streak.streak_days
        );
        self.state.session_metrics.push(metric);
        self.save_metrics();
    }

    pub fn toggle_immersive(&mut self) {
        self.state.is_immersive = !self.state.is_immersive;
    }

    pub fn toggle_music(&mut self) {
        self.state.is_music_active = !self.state.is_music_active;
    }

    pub fn toggle_binaural(&mut self) {
        self.state.is_binaural_enabled = !self.state.is_binaural_enabled;
    }

    pub fn toggle_key_sounds(&mut self) {
        self.state.key_sounds_enabled = !self.state.key_sounds_enabled;
    }

    pub fn toggle_breath_mode(&mut self) {
        self.state.breath_mode_active = !self.state.breath_mode_active;
    }

    /// Escape leaves immersive mode; every other key is ignored here.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if key == "Escape" && self.state.is_immersive {
            self.state.is_immersive = false;
            return true;
        }
        false
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.state.theme_mode = mode;
    }

    pub fn set_ambience(&mut self, patch: AmbiencePatch) {
        self.state.ambience.merge(patch);
    }

    pub fn trigger_calm_protocol(&mut self) {
        self.state.current_vibe = catalog::calm_vibe();
    }

    pub fn apply_preset(&mut self, preset: PresetId) {
        match preset.session() {
            Some(session) => self.apply_session_preset(session),
            None => self.trigger_calm_protocol(),
        }
    }

    fn apply_session_preset(&mut self, preset: SessionPreset) {
        self.state.current_vibe = preset.vibe;
        self.state.timer = TimerState::started(preset.minutes);
        self.state.is_music_active = preset.music;
        self.state.is_binaural_enabled = preset.binaural;
        self.state.ambience = preset.ambience;
    }

    pub fn apply_deep_work_preset(&mut self) {
        self.apply_preset(PresetId::DeepWork);
    }

    pub fn apply_preset_standup(&mut self) {
        self.apply_preset(PresetId::Standup);
    }

    pub fn apply_preset_bug_hunt(&mut self) {
        self.apply_preset(PresetId::BugHunt);
    }

    pub fn apply_preset_code_review(&mut self) {
        self.apply_preset(PresetId::CodeReview);
    }

    pub fn apply_preset_ship_mode(&mut self) {
        self.apply_preset(PresetId::ShipMode);
    }

    pub fn apply_preset_sleep_recovery(&mut self) {
        self.apply_preset(PresetId::SleepRecovery);
    }

    pub fn apply_preset_learning(&mut self) {
        self.apply_preset(PresetId::Learning);
    }

    pub fn dismiss_tool_hint(&mut self, hint: ToolHint) {
        self.state.tool_hints.dismiss(hint);
    }

    pub fn set_feature_flag(&mut self, flag: FeatureFlag, value: bool) {
        self.state.feature_flags.set(flag, value);
    }

    pub fn restore_preferences(&mut self, theme: ThemeMode, flags: FeatureFlags, hints: ToolHints) {
        self.state.theme_mode = theme;
        self.state.feature_flags = flags;
        self.state.tool_hints = hints;
    }

    pub fn metrics_record(&self) -> MetricsRecord {
        MetricsRecord {
            streak_days: self.state.streak.streak_days,
            last_focus_day: self.state.streak.last_focus_day.clone(),
            completed_sessions: self.state.completed_sessions,
            session_metrics: self.state.session_metrics.clone(),
        }
    }

    /// Loads the persisted record. Never fails: unreadable storage leaves the
    /// current values, malformed fields default one by one.
    pub fn load_metrics(&mut self) {
        let contents = match self.backend.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return,
            Err(err) => {
                warn!("Failed to load metrics: {err:#}");
                return;
            }
        };

        let record = persistence::parse_record(&contents);
        self.state.streak = record.streak();
        self.state.completed_sessions = record.completed_sessions;
        self.state.session_metrics = record.session_metrics;
    }

    /// Best-effort write of the metrics record; failures are logged only.
    pub fn save_metrics(&self) {
        if let Err(err) = self.try_save_metrics() {
            warn!("Failed to save metrics: {err:#}");
        }
    }

    fn try_save_metrics(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.metrics_record())?;
        self.backend.write(&serialized)
    }

    pub fn export_metrics(&self) -> MetricsExport {
        MetricsExport::new(&self.metrics_record(), self.clock.now())
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_metrics())?)
    }
}

/// Cloneable handle to the one store of a running session. Every `update`
/// bumps a revision that the timer, audio and animation loops watch.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<VibeStore>>,
    revision: Arc<watch::Sender<u64>>,
}

impl SharedStore {
    pub fn new(store: VibeStore) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(store)),
            revision: Arc::new(revision),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VibeStore> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn update<R>(&self, mutate: impl FnOnce(&mut VibeStore) -> R) -> R {
        let result = {
            let mut guard = self.lock();
            mutate(&mut guard)
        };
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
        result
    }

    pub fn read<R>(&self, inspect: impl FnOnce(&VibeStore) -> R) -> R {
        let guard = self.lock();
        inspect(&guard)
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
