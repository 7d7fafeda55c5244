use serde::Serialize;

pub const INHALE_SECS: f32 = 4.0;
pub const HOLD_SECS: f32 = 4.0;
pub const EXHALE_SECS: f32 = 8.0;
pub const CYCLE_SECS: f32 = INHALE_SECS + HOLD_SECS + EXHALE_SECS;

const BASE_RADIUS: f32 = 180.0;
const RADIUS_SWING: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::Hold => "Hold",
            BreathPhase::Exhale => "Exhale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BreathFrame {
    pub phase: BreathPhase,
    /// 0 at empty lungs, 1 at full.
    pub progress: f32,
    pub radius: f32,
}

/// Where a 4-4-8 breathing cycle is `elapsed_secs` after it started.
pub fn breath_at(elapsed_secs: f32) -> BreathFrame {
    let t = elapsed_secs.max(0.0) % CYCLE_SECS;

    let (phase, progress) = if t < INHALE_SECS {
        (BreathPhase::Inhale, t / INHALE_SECS)
    } else if t < INHALE_SECS + HOLD_SECS {
        (BreathPhase::Hold, 1.0)
    } else {
        let into_exhale = t - (INHALE_SECS + HOLD_SECS);
        (BreathPhase::Exhale, 1.0 - into_exhale / EXHALE_SECS)
    };

    BreathFrame {
        phase,
        progress,
        radius: BASE_RADIUS + RADIUS_SWING * progress,
    }
}
