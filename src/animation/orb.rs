use serde::Serialize;

use crate::store::StoreState;

use super::color::Rgb;

pub const BASE_SCALE: f32 = 2.2;
const MIN_TIMER_SCALE: f32 = 0.8;
const TIMER_SCALE_RANGE: f32 = 1.4;
const BEAT_RATE: f32 = 4.0;
const BEAT_DEPTH: f32 = 0.06;
const STRESS_JITTER_THRESHOLD: u8 = 60;
const STRESS_JITTER_RATE: f32 = 20.0;
const STRESS_JITTER_DEPTH: f32 = 0.04;

/// The slice of store state the orb follows.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbInputs {
    pub orb_color: Option<Rgb>,
    pub distort: f32,
    pub speed: f32,
    pub roughness: f32,
    pub stress_level: u8,
    /// Remaining share of the running timer, `None` when idle.
    pub timer_fraction: Option<f32>,
    pub music_active: bool,
}

impl OrbInputs {
    pub fn from_state(state: &StoreState) -> Self {
        let vibe = &state.current_vibe;
        Self {
            orb_color: Rgb::parse_hex(&vibe.colors.orb_color),
            distort: vibe.shape_params.distort,
            speed: vibe.shape_params.speed,
            roughness: vibe.shape_params.roughness,
            stress_level: vibe.stress_level,
            timer_fraction: state.timer.remaining_fraction(),
            music_active: state.is_music_active,
        }
    }

    /// Extra wobble in 0..=1.
    pub fn jitter(&self) -> f32 {
        f32::from(self.stress_level) / 100.0
    }

    pub fn target_distort(&self) -> f32 {
        self.distort + self.jitter() * 0.2
    }

    pub fn target_speed(&self) -> f32 {
        self.speed + self.jitter() * 0.5
    }
}

/// Scale the orb is heading for at `elapsed_secs` into the animation.
pub fn target_scale(inputs: &OrbInputs, elapsed_secs: f32) -> f32 {
    let mut scale = match inputs.timer_fraction {
        Some(fraction) => MIN_TIMER_SCALE + TIMER_SCALE_RANGE * fraction,
        None => BASE_SCALE,
    };

    if inputs.music_active {
        scale += (elapsed_secs * BEAT_RATE).sin() * BEAT_DEPTH;
    }

    if inputs.stress_level > STRESS_JITTER_THRESHOLD {
        let severity = f32::from(inputs.stress_level - STRESS_JITTER_THRESHOLD) / 40.0;
        scale += (elapsed_secs * STRESS_JITTER_RATE).sin() * STRESS_JITTER_DEPTH * severity;
    }

    scale
}

fn lerp(from: f32, to: f32, alpha: f32) -> f32 {
    from + (to - from) * alpha.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbFrame {
    pub color: String,
    pub distort: f32,
    pub speed: f32,
    pub roughness: f32,
    pub scale: f32,
}

/// Smoothed orb material and scale. Each frame moves every quantity a
/// delta-scaled step toward its target; nothing ever snaps.
#[derive(Debug, Clone)]
pub struct OrbDriver {
    color: Rgb,
    distort: f32,
    speed: f32,
    scale: f32,
}

impl OrbDriver {
    /// Starts at rest on the given vibe, at base scale.
    pub fn new(inputs: &OrbInputs) -> Self {
        Self {
            color: inputs.orb_color.unwrap_or(Rgb::BLACK),
            distort: inputs.distort,
            speed: inputs.speed,
            scale: BASE_SCALE,
        }
    }

    pub fn frame(&mut self, inputs: &OrbInputs, delta_secs: f32, elapsed_secs: f32) -> OrbFrame {
        let delta = delta_secs.max(0.0);

        // Unparseable colours leave the orb where it is
        if let Some(target) = inputs.orb_color {
            self.color = self.color.lerp(target, delta * 2.0);
        }
        self.distort = lerp(self.distort, inputs.target_distort(), delta * 2.0);
        self.speed = lerp(self.speed, inputs.target_speed(), delta * 2.0);
        self.scale = lerp(self.scale, target_scale(inputs, elapsed_secs), delta * 3.0);

        OrbFrame {
            color: self.color.to_hex(),
            distort: self.distort,
            speed: self.speed,
            roughness: inputs.roughness,
            scale: self.scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}
