use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Flat-spectrum hiss bed.
pub struct WhiteNoise {
    rng: StdRng,
}

impl WhiteNoise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for WhiteNoise {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.rng.gen_range(-1.0..1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roughly_zero_mean() {
        let n = 50_000;
        let sum: f32 = WhiteNoise::seeded(11).take(n).sum();
        assert!((sum / n as f32).abs() < 0.02);
    }
}
