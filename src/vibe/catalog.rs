use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Ambience, BinauralMode, Colors, ShapeParams, SoundParams, VibeDescriptor, WaveType};

pub const DEFAULT_STRESS_LEVEL: u8 = 10;

/// Static form of a catalog entry; `build` turns it into an owned descriptor.
struct VibeTemplate {
    name: &'static str,
    background: &'static str,
    accent: &'static str,
    orb_color: &'static str,
    distort: f32,
    speed: f32,
    roughness: f32,
    frequency: f32,
    wave_type: WaveType,
    binaural_mode: BinauralMode,
    pan_drift_speed: f32,
    message: &'static str,
    suggested_ritual: &'static str,
    stress_level: u8,
}

impl VibeTemplate {
    fn build(&self) -> VibeDescriptor {
        VibeDescriptor {
            name: self.name.to_string(),
            colors: Colors {
                background: self.background.to_string(),
                accent: self.accent.to_string(),
                orb_color: self.orb_color.to_string(),
            },
            shape_params: ShapeParams {
                distort: self.distort,
                speed: self.speed,
                roughness: self.roughness,
            },
            sound_params: SoundParams {
                frequency: self.frequency,
                wave_type: self.wave_type,
                binaural_mode: self.binaural_mode,
                pan_drift_speed: self.pan_drift_speed,
            },
            message: self.message.to_string(),
            suggested_ritual: self.suggested_ritual.to_string(),
            stress_level: self.stress_level,
        }
    }
}

const DEFAULT_VIBE: VibeTemplate = VibeTemplate {
    name: "Systems Nominal",
    background: "#030303",
    accent: "#a855f7",
    orb_color: "#6020a0",
    distort: 0.3,
    speed: 1.5,
    roughness: 0.2,
    frequency: 60.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Off,
    pan_drift_speed: 0.1,
    message: "Operating System Online. Awaiting input...",
    suggested_ritual: "",
    stress_level: DEFAULT_STRESS_LEVEL,
};

const CALM_VIBE: VibeTemplate = VibeTemplate {
    name: "Calm Protocol",
    background: "#02010a",
    accent: "#38bdf8",
    orb_color: "#1e293b",
    distort: 0.1,
    speed: 0.4,
    roughness: 0.1,
    frequency: 60.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Sleep,
    pan_drift_speed: 0.02,
    message: "Breathing down the system load. Nothing is on fire.",
    suggested_ritual: "Slow inhale 4s, hold 4s, exhale 8s. Repeat 5 times.",
    stress_level: 20,
};

const DEEP_WORK_VIBE: VibeTemplate = VibeTemplate {
    name: "Deep Work Tunnel",
    background: "#020617",
    accent: "#38bdf8",
    orb_color: "#0f172a",
    distort: 0.25,
    speed: 0.8,
    roughness: 0.15,
    frequency: 110.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Focus,
    pan_drift_speed: 0.08,
    message: "Tunnel vision engaged. External noise deprioritized.",
    suggested_ritual: "Pick one task. No context switching until timer ends.",
    stress_level: 35,
};

const STANDUP_VIBE: VibeTemplate = VibeTemplate {
    name: "Pre-Standup",
    background: "#0f172a",
    accent: "#10b981",
    orb_color: "#047857",
    distort: 0.15,
    speed: 0.6,
    roughness: 0.1,
    frequency: 80.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Calm,
    pan_drift_speed: 0.05,
    message: "Light focus. Gather your thoughts for the team.",
    suggested_ritual: "Quick review of yesterday. One sentence per point.",
    stress_level: 15,
};

const BUG_HUNT_VIBE: VibeTemplate = VibeTemplate {
    name: "Bug Hunt Mode",
    background: "#1a0a0a",
    accent: "#ef4444",
    orb_color: "#7f1d1d",
    distort: 0.4,
    speed: 2.0,
    roughness: 0.3,
    frequency: 140.0,
    wave_type: WaveType::Sawtooth,
    binaural_mode: BinauralMode::Focus,
    pan_drift_speed: 0.15,
    message: "Debug mode active. Find it. Fix it. Move on.",
    suggested_ritual: "Isolate the bug. Write a test. Verify the fix.",
    stress_level: 75,
};

const CODE_REVIEW_VIBE: VibeTemplate = VibeTemplate {
    name: "Code Review Mode",
    background: "#082f49",
    accent: "#0ea5e9",
    orb_color: "#0c4a6e",
    distort: 0.2,
    speed: 0.7,
    roughness: 0.12,
    frequency: 90.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Calm,
    pan_drift_speed: 0.06,
    message: "Analytical mode. Read code like prose.",
    suggested_ritual: "One PR at a time. Constructive feedback only.",
    stress_level: 30,
};

const SHIP_MODE_VIBE: VibeTemplate = VibeTemplate {
    name: "Ship Mode",
    background: "#1f0101",
    accent: "#fbbf24",
    orb_color: "#b45309",
    distort: 0.35,
    speed: 1.8,
    roughness: 0.25,
    frequency: 130.0,
    wave_type: WaveType::Triangle,
    binaural_mode: BinauralMode::Focus,
    pan_drift_speed: 0.12,
    message: "Shipping adrenaline. Go fast. Break things. Fix them.",
    suggested_ritual: "50 min sprint. Test. Deploy. Celebrate.",
    stress_level: 70,
};

const SLEEP_RECOVERY_VIBE: VibeTemplate = VibeTemplate {
    name: "Sleep Recovery",
    background: "#0a0515",
    accent: "#8b5cf6",
    orb_color: "#2e1065",
    distort: 0.08,
    speed: 0.3,
    roughness: 0.08,
    frequency: 40.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Sleep,
    pan_drift_speed: 0.01,
    message: "Theta wave mode. Let your mind wander.",
    suggested_ritual: "90 min session. Minimal caffeine. Lights dimmed.",
    stress_level: 5,
};

const LEARNING_VIBE: VibeTemplate = VibeTemplate {
    name: "Learning Mode",
    background: "#0d2818",
    accent: "#84cc16",
    orb_color: "#3f6212",
    distort: 0.22,
    speed: 1.0,
    roughness: 0.16,
    frequency: 100.0,
    wave_type: WaveType::Sine,
    binaural_mode: BinauralMode::Calm,
    pan_drift_speed: 0.09,
    message: "Curiosity mode. Absorb everything.",
    suggested_ritual: "Take notes. Ask questions. Build a small project.",
    stress_level: 25,
};

pub fn default_vibe() -> VibeDescriptor {
    DEFAULT_VIBE.build()
}

pub fn calm_vibe() -> VibeDescriptor {
    CALM_VIBE.build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetId {
    DeepWork,
    Standup,
    BugHunt,
    CodeReview,
    ShipMode,
    Learning,
    #[serde(rename = "rest")]
    SleepRecovery,
    Calm,
}

/// Everything a session preset overwrites in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPreset {
    pub vibe: VibeDescriptor,
    pub minutes: u32,
    pub music: bool,
    pub binaural: bool,
    pub ambience: Ambience,
}

impl PresetId {
    pub const ALL: [PresetId; 8] = [
        PresetId::DeepWork,
        PresetId::Standup,
        PresetId::BugHunt,
        PresetId::CodeReview,
        PresetId::ShipMode,
        PresetId::Learning,
        PresetId::SleepRecovery,
        PresetId::Calm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetId::DeepWork => "deep-work",
            PresetId::Standup => "standup",
            PresetId::BugHunt => "bug-hunt",
            PresetId::CodeReview => "code-review",
            PresetId::ShipMode => "ship-mode",
            PresetId::Learning => "learning",
            PresetId::SleepRecovery => "rest",
            PresetId::Calm => "calm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PresetId::DeepWork => "Deep Work",
            PresetId::Standup => "Standup",
            PresetId::BugHunt => "Bug Hunt",
            PresetId::CodeReview => "Code Review",
            PresetId::ShipMode => "Ship Mode",
            PresetId::Learning => "Learning",
            PresetId::SleepRecovery => "Sleep Recovery",
            PresetId::Calm => "Calm Protocol",
        }
    }

    pub fn vibe(self) -> VibeDescriptor {
        let template = match self {
            PresetId::DeepWork => &DEEP_WORK_VIBE,
            PresetId::Standup => &STANDUP_VIBE,
            PresetId::BugHunt => &BUG_HUNT_VIBE,
            PresetId::CodeReview => &CODE_REVIEW_VIBE,
            PresetId::ShipMode => &SHIP_MODE_VIBE,
            PresetId::Learning => &LEARNING_VIBE,
            PresetId::SleepRecovery => &SLEEP_RECOVERY_VIBE,
            PresetId::Calm => &CALM_VIBE,
        };
        template.build()
    }

    /// Timer, toggles and ambience for presets that start a session. The calm
    /// protocol only swaps the vibe, so it has none.
    pub fn session(self) -> Option<SessionPreset> {
        let (minutes, music, binaural, ambience) = match self {
            PresetId::DeepWork => (60, true, true, Ambience::new(0.3, 0.0, 0.1)),
            PresetId::Standup => (15, false, false, Ambience::new(0.0, 0.1, 0.0)),
            PresetId::BugHunt => (45, true, true, Ambience::new(0.1, 0.0, 0.2)),
            PresetId::CodeReview => (30, true, false, Ambience::new(0.1, 0.2, 0.0)),
            PresetId::ShipMode => (60, true, true, Ambience::new(0.4, 0.0, 0.1)),
            PresetId::Learning => (50, true, false, Ambience::new(0.0, 0.3, 0.0)),
            PresetId::SleepRecovery => (20, true, true, Ambience::new(0.5, 0.0, 0.1)),
            PresetId::Calm => return None,
        };

        Some(SessionPreset {
            vibe: self.vibe(),
            minutes,
            music,
            binaural,
            ambience,
        })
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PresetId::ALL
            .into_iter()
            .find(|preset| preset.as_str() == value)
            .ok_or_else(|| format!("unknown preset '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_ids_round_trip_through_strings() {
        for preset in PresetId::ALL {
            assert_eq!(preset.as_str().parse::<PresetId>(), Ok(preset));
        }
        assert!("warp-speed".parse::<PresetId>().is_err());
    }

    #[test]
    fn serde_ids_match_display_ids() {
        for preset in PresetId::ALL {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.as_str()));
        }
    }

    #[test]
    fn vibe_names_are_unique() {
        let mut names: Vec<String> = PresetId::ALL.iter().map(|p| p.vibe().name).collect();
        names.push(default_vibe().name);
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn only_calm_has_no_session() {
        for preset in PresetId::ALL {
            assert_eq!(preset.session().is_none(), preset == PresetId::Calm);
        }
        assert_eq!(PresetId::Calm.vibe(), calm_vibe());
    }

    #[test]
    fn bug_hunt_session_shape() {
        let session = PresetId::BugHunt.session().unwrap();
        assert_eq!(session.minutes, 45);
        assert!(session.music);
        assert!(session.binaural);
        assert_eq!(session.ambience, Ambience::new(0.1, 0.0, 0.2));
        assert_eq!(session.vibe.sound_params.wave_type, WaveType::Sawtooth);
    }
}
