use crate::vibe::WaveType;

use super::ramp::{RampShape, RampedParam};

/// Cutoff the tone bus settles at for each waveform. Brighter waves are
/// filtered harder so every vibe sits at a similar perceived loudness.
pub fn filter_cutoff(wave: WaveType) -> f32 {
    match wave {
        WaveType::Sine => 600.0,
        WaveType::Sawtooth => 200.0,
        WaveType::Square => 150.0,
        _ => 300.0,
    }
}

// Resonance ~0.3 gives k ~1.4, a Butterworth-like Q of ~0.7.
const RESONANCE: f32 = 0.3;

/// Topology-preserving state variable lowpass (Cytomic SVF), one channel.
#[derive(Debug, Clone)]
pub struct SvfLowpass {
    ic1eq: f32,
    ic2eq: f32,
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SvfLowpass {
    pub fn new(cutoff: f32, sample_rate: u32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
        };
        filter.set_cutoff(cutoff, sample_rate);
        filter
    }

    pub fn set_cutoff(&mut self, cutoff: f32, sample_rate: u32) {
        let sample_rate = sample_rate as f32;
        let cutoff = cutoff.clamp(20.0, (sample_rate * 0.49).max(20.0));

        let g = (std::f32::consts::PI * cutoff / sample_rate).tan();
        let k = 2.0 - 2.0 * RESONANCE;
        self.a1 = 1.0 / (1.0 + g * (g + k));
        self.a2 = g * self.a1;
        self.a3 = g * self.a2;
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let v3 = input - self.ic2eq;
        let v1 = self.a1 * self.ic1eq + self.a2 * v3;
        let v2 = self.ic2eq + self.a2 * self.ic1eq + self.a3 * v3;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }
}

/// Stereo lowpass whose cutoff glides. Coefficients are refreshed once per
/// control block, not per sample.
pub struct ToneFilter {
    left: SvfLowpass,
    right: SvfLowpass,
    cutoff: RampedParam,
    sample_rate: u32,
    stale: bool,
}

impl ToneFilter {
    pub fn new(cutoff: f32, sample_rate: u32) -> Self {
        Self {
            left: SvfLowpass::new(cutoff, sample_rate),
            right: SvfLowpass::new(cutoff, sample_rate),
            cutoff: RampedParam::new(cutoff),
            sample_rate,
            stale: false,
        }
    }

    pub fn glide_to(&mut self, cutoff: f32, seconds: f32) {
        self.cutoff
            .ramp_to(cutoff, seconds, self.sample_rate, RampShape::Exponential);
        self.stale = true;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.value()
    }

    /// Advances the cutoff ramp by `samples` and recomputes coefficients.
    pub fn advance_control(&mut self, samples: usize) {
        if !self.stale {
            return;
        }
        let mut cutoff = self.cutoff.value();
        for _ in 0..samples {
            cutoff = self.cutoff.next_value();
        }
        self.left.set_cutoff(cutoff, self.sample_rate);
        self.right.set_cutoff(cutoff, self.sample_rate);
        self.stale = !self.cutoff.is_settled();
    }

    #[inline]
    pub fn process(&mut self, (left, right): (f32, f32)) -> (f32, f32) {
        (self.left.process(left), self.right.process(right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_follows_the_waveform() {
        assert_eq!(filter_cutoff(WaveType::Sine), 600.0);
        assert_eq!(filter_cutoff(WaveType::Sawtooth), 200.0);
        assert_eq!(filter_cutoff(WaveType::Square), 150.0);
        assert_eq!(filter_cutoff(WaveType::Triangle), 300.0);
    }

    #[test]
    fn passes_dc_and_damps_nyquist() {
        let mut filter = SvfLowpass::new(200.0, 44_100);
        let mut dc = 0.0;
        for _ in 0..10_000 {
            dc = filter.process(1.0);
        }
        assert!((dc - 1.0).abs() < 1e-3);

        let mut filter = SvfLowpass::new(200.0, 44_100);
        let mut peak: f32 = 0.0;
        for n in 0..10_000 {
            let input = if n % 2 == 0 { 1.0 } else { -1.0 };
            let out = filter.process(input);
            if n > 1_000 {
                peak = peak.max(out.abs());
            }
        }
        assert!(peak < 0.01);
    }

    #[test]
    fn cutoff_glide_lands_on_target() {
        let mut filter = ToneFilter::new(200.0, 1_000);
        filter.glide_to(600.0, 2.0);
        for _ in 0..40 {
            filter.advance_control(50);
        }
        assert!((filter.cutoff() - 600.0).abs() < 1e-2);
    }
}
