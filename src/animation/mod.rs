pub mod breath;
pub mod color;
pub mod frame_loop;
pub mod orb;

pub use breath::{breath_at, BreathFrame, BreathPhase};
pub use color::Rgb;
pub use frame_loop::FrameLoopController;
pub use orb::{target_scale, OrbDriver, OrbFrame, OrbInputs};

use serde::Serialize;

use crate::store::StoreState;

/// Everything the view draws for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationFrame {
    pub elapsed_secs: f32,
    pub orb: OrbFrame,
    /// Present only while breath mode is on.
    pub breath: Option<BreathFrame>,
}

/// Per-frame state: the smoothed orb and the breath guide's own clock, which
/// restarts every time breath mode is switched on.
pub struct Animator {
    orb: Option<OrbDriver>,
    breath_started_at: Option<f32>,
}

impl Animator {
    pub fn new() -> Self {
        Self {
            orb: None,
            breath_started_at: None,
        }
    }

    pub fn step(&mut self, state: &StoreState, delta_secs: f32, elapsed_secs: f32) -> AnimationFrame {
        let inputs = OrbInputs::from_state(state);
        let orb = self
            .orb
            .get_or_insert_with(|| OrbDriver::new(&inputs))
            .frame(&inputs, delta_secs, elapsed_secs);

        let breath = if state.breath_mode_active {
            let started = *self.breath_started_at.get_or_insert(elapsed_secs);
            Some(breath_at(elapsed_secs - started))
        } else {
            self.breath_started_at = None;
            None
        };

        AnimationFrame {
            elapsed_secs,
            orb,
            breath,
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}
