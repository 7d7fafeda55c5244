use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::filter::SvfLowpass;

const BODY_CUTOFF_HZ: f32 = 2_500.0;
const DROPLETS_PER_SEC: f32 = 18.0;
const DROPLET_DECAY_SECS: f32 = 0.004;
const SWELL_RAD_PER_SEC: f32 = 0.3;
pub const RAIN_GAIN: f32 = 0.35;

/// Rain bed: low-passed hiss for the downpour, sparse droplet ticks on top,
/// and a slow swell so the shower comes and goes.
pub struct RainSound {
    rng: StdRng,
    body: SvfLowpass,
    droplet: f32,
    droplet_decay: f32,
    droplet_chance: f32,
    swell_phase: f32,
    swell_step: f32,
}

impl RainSound {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_rng(sample_rate, StdRng::from_entropy())
    }

    pub fn seeded(sample_rate: u32, seed: u64) -> Self {
        Self::with_rng(sample_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample_rate: u32, rng: StdRng) -> Self {
        let rate = sample_rate.max(1) as f32;
        Self {
            rng,
            body: SvfLowpass::new(BODY_CUTOFF_HZ, sample_rate),
            droplet: 0.0,
            droplet_decay: (-1.0 / (DROPLET_DECAY_SECS * rate)).exp(),
            droplet_chance: DROPLETS_PER_SEC / rate,
            swell_phase: 0.0,
            swell_step: SWELL_RAD_PER_SEC / rate,
        }
    }
}

impl Iterator for RainSound {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        let body = self.body.process(white);

        if self.rng.gen::<f32>() < self.droplet_chance {
            self.droplet = self.rng.gen_range(0.3..1.0);
        }
        let tick = self.droplet * white;
        self.droplet *= self.droplet_decay;

        self.swell_phase = (self.swell_phase + self.swell_step) % std::f32::consts::TAU;
        let swell = 0.75 + 0.25 * self.swell_phase.sin();

        let sample = (body * 0.7 + tick * 0.3) * swell;
        Some(sample.clamp(-1.0, 1.0) * RAIN_GAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rain_is_reproducible() {
        let a: Vec<f32> = RainSound::seeded(44_100, 3).take(512).collect();
        let b: Vec<f32> = RainSound::seeded(44_100, 3).take(512).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn stays_within_gain_and_is_audible() {
        let samples: Vec<f32> = RainSound::seeded(44_100, 11).take(44_100).collect();
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= RAIN_GAIN));

        let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
        assert!(rms > 0.01, "rain too quiet: {rms}");
    }

    #[test]
    fn droplets_fade_quickly() {
        let mut rain = RainSound::seeded(44_100, 5);
        rain.droplet = 1.0;
        // 10 decay constants later the tick is gone
        for _ in 0..(DROPLET_DECAY_SECS * 44_100.0 * 10.0) as usize {
            rain.droplet *= rain.droplet_decay;
        }
        assert!(rain.droplet < 1e-4);
    }
}
