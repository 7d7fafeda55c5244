use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Café murmur bed: brown noise (integrated white noise) with a slow chatter swell.
/// Power falls 6 dB per octave, which reads as a distant room rather than hiss.
pub struct BrownNoise {
    sample_rate: u32,
    last_value: f32,
    rng: StdRng,
    chatter_phase: f32,
}

impl BrownNoise {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_rng(sample_rate, StdRng::from_entropy())
    }

    pub fn seeded(sample_rate: u32, seed: u64) -> Self {
        Self::with_rng(sample_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample_rate: u32, rng: StdRng) -> Self {
        Self {
            sample_rate,
            last_value: 0.0,
            rng,
            chatter_phase: 0.0,
        }
    }
}

impl Iterator for BrownNoise {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);

        // Integrate, clamp, and leak a little to keep DC from building up
        self.last_value += white * 0.02;
        self.last_value = self.last_value.clamp(-1.0, 1.0);
        self.last_value *= 0.9999;

        self.chatter_phase += 0.7 / self.sample_rate as f32;
        if self.chatter_phase > std::f32::consts::TAU {
            self.chatter_phase -= std::f32::consts::TAU;
        }
        let swell = 0.85 + 0.15 * self.chatter_phase.sin();

        Some(self.last_value * swell * 0.3)
    }
}
