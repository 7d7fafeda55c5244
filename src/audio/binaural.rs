use std::f32::consts::TAU;

use crate::vibe::{BinauralMode, WaveType};

use super::ramp::{RampShape, RampedParam};

/// Lowest tone either channel is allowed to reach.
pub const MIN_TONE_HZ: f32 = 40.0;

/// Left/right tone frequencies for a base pitch.
///
/// With binaural off (globally or by mode) both ears get the same pitch;
/// otherwise they straddle the base by half the mode's beat.
pub fn tone_targets(base_hz: f32, mode: BinauralMode, enabled: bool) -> (f32, f32) {
    let base = base_hz.max(MIN_TONE_HZ);
    match mode.beat_hz().filter(|_| enabled) {
        None => (base, base),
        Some(beat) => (
            (base - beat / 2.0).max(MIN_TONE_HZ),
            (base + beat / 2.0).max(MIN_TONE_HZ),
        ),
    }
}

/// Phase-accumulating oscillator whose frequency glides exponentially.
pub struct Oscillator {
    wave: WaveType,
    phase: f32,
    frequency: RampedParam,
    sample_rate: u32,
}

impl Oscillator {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            wave: WaveType::Sine,
            phase: 0.0,
            frequency: RampedParam::new(frequency),
            sample_rate,
        }
    }

    pub fn set_wave(&mut self, wave: WaveType) {
        self.wave = wave;
    }

    pub fn glide_to(&mut self, frequency: f32, seconds: f32) {
        self.frequency
            .ramp_to(frequency, seconds, self.sample_rate, RampShape::Exponential);
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let freq = self.frequency.next_value();
        let sample = match self.wave {
            WaveType::Sine => (TAU * self.phase).sin(),
            WaveType::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            WaveType::Sawtooth => 2.0 * self.phase - 1.0,
            WaveType::Triangle => 1.0 - 4.0 * (self.phase - 0.5).abs(),
        };

        self.phase += freq / self.sample_rate as f32;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        sample
    }
}

/// Two detuned tone generators, one per ear.
pub struct BinauralPair {
    left: Oscillator,
    right: Oscillator,
}

impl BinauralPair {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            left: Oscillator::new(frequency, sample_rate),
            right: Oscillator::new(frequency, sample_rate),
        }
    }

    pub fn retune(&mut self, left_hz: f32, right_hz: f32, wave: WaveType, seconds: f32) {
        self.left.set_wave(wave);
        self.right.set_wave(wave);
        self.left.glide_to(left_hz, seconds);
        self.right.glide_to(right_hz, seconds);
    }

    pub fn frequencies(&self) -> (f32, f32) {
        (self.left.frequency(), self.right.frequency())
    }

    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        (self.left.next_sample(), self.right.next_sample())
    }
}
