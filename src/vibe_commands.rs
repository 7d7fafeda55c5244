use chrono::{Local, Timelike};
use serde::Serialize;

use crate::{
    classifier::resolve_mood,
    models::{FeatureFlag, HistoryEntry, ToolHint},
    vibe::{
        resolve_theme,
        share::{share_url, vibe_from_url},
        Ambience, AmbienceChannel, AmbiencePatch, Palette, ThemeMode,
    },
    AppState,
};

/// Classifies free text and applies the result. Blank input is ignored and
/// returns `None`; otherwise returns the new vibe's name.
pub async fn submit_mood(state: &AppState, text: &str) -> Result<Option<String>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    state.store.update(|store| store.set_thinking(true));
    let patch = resolve_mood(state.classifier.as_deref(), text).await;

    let name = state.store.update(|store| {
        store.set_vibe_partial(patch);
        let name = store.current_vibe().name.clone();
        store.add_history_entry(text, &name);
        store.set_thinking(false);
        name
    });
    log::info!("vibe check '{}' -> {}", text, name);
    Ok(Some(name))
}

/// History, newest first, with the index `restore_history` expects.
pub fn history(state: &AppState) -> Vec<(usize, HistoryEntry)> {
    state.store.read(|store| {
        store
            .state()
            .history
            .newest_first()
            .map(|(index, entry)| (index, entry.clone()))
            .collect()
    })
}

pub fn restore_history(state: &AppState, index: usize) -> Result<bool, String> {
    Ok(state.store.update(|store| store.restore_history_index(index)))
}

pub fn share_vibe(state: &AppState) -> Result<String, String> {
    let vibe = state.store.read(|store| store.current_vibe().clone());
    share_url(&state.config.share_origin, &vibe).map_err(|e| e.to_string())
}

/// Applies a shared vibe link. Unreadable links are logged and leave the
/// current vibe alone.
pub fn open_share_link(state: &AppState, link: &str) -> Result<bool, String> {
    match vibe_from_url(link) {
        Ok(vibe) => {
            log::info!("opened shared vibe {}", vibe.name);
            state.store.update(|store| store.set_vibe_absolute(vibe));
            Ok(true)
        }
        Err(err) => {
            log::warn!("ignoring shared vibe link: {}", err);
            Ok(false)
        }
    }
}

pub fn set_ambience(state: &AppState, channel: &str, level: f32) -> Result<Ambience, String> {
    let channel: AmbienceChannel = channel.parse()?;
    if !(0.0..=1.0).contains(&level) {
        return Err(format!("ambience level {level} is outside 0..1"));
    }
    Ok(state.store.update(|store| {
        store.set_ambience(AmbiencePatch::channel(channel, level));
        store.state().ambience
    }))
}

/// Flips one of the independent switches and returns its new value.
pub fn toggle(state: &AppState, name: &str) -> Result<bool, String> {
    state.store.update(|store| {
        let flag = match name {
            "immersive" => {
                store.toggle_immersive();
                store.state().is_immersive
            }
            "music" => {
                store.toggle_music();
                store.state().is_music_active
            }
            "binaural" => {
                store.toggle_binaural();
                store.state().is_binaural_enabled
            }
            "keys" => {
                store.toggle_key_sounds();
                store.state().key_sounds_enabled
            }
            "breath" => {
                store.toggle_breath_mode();
                store.state().breath_mode_active
            }
            other => return Err(format!("unknown toggle '{other}'")),
        };
        Ok(flag)
    })
}

/// A key press: Escape may leave immersive mode, and every key clicks while
/// key sounds are on.
pub fn press_key(state: &AppState, key: &str) -> Result<(), String> {
    let clicks = state.store.update(|store| {
        store.handle_key(key);
        store.state().key_sounds_enabled
    });
    if clicks {
        state.audio.key_click(key)?;
    }
    Ok(())
}

pub fn set_theme_mode(state: &AppState, mode: &str) -> Result<Palette, String> {
    let mode: ThemeMode = mode.parse()?;
    state.store.update(|store| store.set_theme_mode(mode));
    state.settings.set_theme_mode(mode).map_err(|e| e.to_string())?;
    Ok(resolve_theme(mode, Local::now().hour()))
}

pub fn set_feature_flag(state: &AppState, flag: &str, value: bool) -> Result<(), String> {
    let flag: FeatureFlag = flag.parse()?;
    state.store.update(|store| store.set_feature_flag(flag, value));
    state
        .settings
        .set_feature_flag(flag, value)
        .map_err(|e| e.to_string())
}

pub fn dismiss_tool_hint(state: &AppState, hint: &str) -> Result<(), String> {
    let hint: ToolHint = hint.parse()?;
    state.store.update(|store| store.dismiss_tool_hint(hint));
    state
        .settings
        .dismiss_tool_hint(hint)
        .map_err(|e| e.to_string())
}

pub fn export_metrics(state: &AppState) -> Result<String, String> {
    state
        .store
        .read(|store| store.export_json())
        .map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub vibe: String,
    pub message: String,
    pub suggested_ritual: String,
    pub stress_level: u8,
    pub timer: String,
    pub timer_active: bool,
    pub streak_days: u32,
    pub completed_sessions: u32,
    pub is_thinking: bool,
    pub is_immersive: bool,
    pub is_music_active: bool,
    pub is_binaural_enabled: bool,
    pub key_sounds_enabled: bool,
    pub breath_mode_active: bool,
    pub ambience: Ambience,
    pub theme: Palette,
    pub muted: bool,
}

pub fn status(state: &AppState) -> StatusReport {
    let muted = state.audio.is_muted();
    let hour = Local::now().hour();
    state.store.read(|store| {
        let s = store.state();
        StatusReport {
            vibe: s.current_vibe.name.clone(),
            message: s.current_vibe.message.clone(),
            suggested_ritual: s.current_vibe.suggested_ritual.clone(),
            stress_level: s.current_vibe.stress_level,
            timer: s.timer.display(),
            timer_active: s.timer.active(),
            streak_days: s.streak.streak_days,
            completed_sessions: s.completed_sessions,
            is_thinking: s.is_thinking,
            is_immersive: s.is_immersive,
            is_music_active: s.is_music_active,
            is_binaural_enabled: s.is_binaural_enabled,
            key_sounds_enabled: s.key_sounds_enabled,
            breath_mode_active: s.breath_mode_active,
            ambience: s.ambience,
            theme: resolve_theme(s.theme_mode, hour),
            muted,
        }
    })
}
