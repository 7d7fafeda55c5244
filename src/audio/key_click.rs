use std::time::Duration;

use rodio::Source;

use super::graph::SAMPLE_RATE;

pub const CLICK_GAIN: f32 = 0.05;
pub const CLICK_DURATION: Duration = Duration::from_millis(50);

/// Pitch of the blip for a key name: 400 Hz plus 80 Hz per step of
/// `len % 5`, where `len` counts UTF-16 units ("a" -> 480, "Enter" -> 400).
pub fn click_frequency(key: &str) -> f32 {
    let len = key.encode_utf16().count();
    400.0 + (len % 5) as f32 * 80.0
}

/// A short, fixed-gain square blip. Finite, so rodio drops it once played.
pub struct KeyClick {
    frequency: f32,
    position: u32,
    total: u32,
}

impl KeyClick {
    pub fn for_key(key: &str) -> Self {
        Self::new(click_frequency(key))
    }

    pub fn new(frequency: f32) -> Self {
        Self {
            frequency,
            position: 0,
            total: (CLICK_DURATION.as_secs_f32() * SAMPLE_RATE as f32) as u32,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl Iterator for KeyClick {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.total {
            return None;
        }
        let phase = (self.position as f32 * self.frequency / SAMPLE_RATE as f32).fract();
        self.position += 1;
        Some(if phase < 0.5 { CLICK_GAIN } else { -CLICK_GAIN })
    }
}

impl Source for KeyClick {
    fn current_frame_len(&self) -> Option<usize> {
        Some((self.total - self.position) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(CLICK_DURATION)
    }
}
