/// How a ramp travels from its start to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampShape {
    Linear,
    /// Constant ratio per sample. Only valid between two positive values;
    /// otherwise the ramp degrades to linear.
    Exponential,
}

/// A control value that glides to new targets sample by sample instead of
/// jumping, so parameter changes never click.
#[derive(Debug, Clone)]
pub struct RampedParam {
    current: f32,
    start: f32,
    target: f32,
    shape: RampShape,
    total_samples: u32,
    elapsed_samples: u32,
}

impl RampedParam {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            start: value,
            target: value,
            shape: RampShape::Linear,
            total_samples: 0,
            elapsed_samples: 0,
        }
    }

    /// Cancels any ramp in flight and starts a new one from the current value.
    pub fn ramp_to(&mut self, target: f32, seconds: f32, sample_rate: u32, shape: RampShape) {
        let total_samples = (seconds.max(0.0) * sample_rate as f32).round() as u32;
        if total_samples == 0 {
            self.set_immediate(target);
            return;
        }

        let shape = match shape {
            RampShape::Exponential if self.current > 0.0 && target > 0.0 => RampShape::Exponential,
            _ => RampShape::Linear,
        };

        self.start = self.current;
        self.target = target;
        self.shape = shape;
        self.total_samples = total_samples;
        self.elapsed_samples = 0;
    }

    pub fn set_immediate(&mut self, value: f32) {
        *self = Self::new(value);
    }

    /// Advances one sample and returns the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.elapsed_samples >= self.total_samples {
            self.current = self.target;
            return self.current;
        }

        self.elapsed_samples += 1;
        let progress = self.elapsed_samples as f32 / self.total_samples as f32;
        self.current = match self.shape {
            RampShape::Linear => self.start + (self.target - self.start) * progress,
            RampShape::Exponential => self.start * (self.target / self.start).powf(progress),
        };
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed_samples >= self.total_samples
    }
}
