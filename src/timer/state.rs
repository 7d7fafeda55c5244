use serde::{Deserialize, Serialize};

/// Countdown state in whole seconds.
///
/// `time_left <= duration` always holds, and a tick that reaches zero clears
/// `active` in the same call, so `time_left == 0 && active` is never observable.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    active: bool,
    time_left: u32,
    duration: u32,
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(minutes: u32) -> Self {
        let seconds = minutes.saturating_mul(60);
        Self {
            active: seconds > 0,
            time_left: seconds,
            duration: seconds,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Advances one second. Returns true when this tick expired the timer.
    pub fn tick(&mut self) -> bool {
        if !self.active || self.time_left == 0 {
            return false;
        }
        self.time_left -= 1;
        self.active = self.time_left > 0;
        !self.active
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Ran out on its own, as opposed to never started or stopped by hand.
    pub fn is_expired(&self) -> bool {
        !self.active && self.duration > 0 && self.time_left == 0
    }

    /// Remaining fraction in 0..=1 while a timer is running.
    pub fn remaining_fraction(&self) -> Option<f32> {
        (self.active && self.duration > 0).then(|| self.time_left as f32 / self.duration as f32)
    }

    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.time_left / 60, self.time_left % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_down_and_deactivates_on_zero() {
        let mut timer = TimerState::started(1);
        let mut previous = timer.time_left();
        for expected_left in (0..60).rev() {
            assert!(timer.active());
            let expired = timer.tick();
            assert!(timer.time_left() <= previous);
            previous = timer.time_left();
            assert_eq!(timer.time_left(), expected_left);
            assert_eq!(expired, expected_left == 0);
            assert_eq!(timer.active(), expected_left > 0);
        }
        assert!(timer.is_expired());
        assert!(!timer.tick());
        assert_eq!(timer.time_left(), 0);
    }

    #[test]
    fn inactive_timer_ignores_ticks() {
        let mut timer = TimerState::new();
        assert!(!timer.tick());
        assert_eq!(timer, TimerState::new());
        assert!(!timer.is_expired());
    }

    #[test]
    fn stop_resets_everything() {
        let mut timer = TimerState::started(25);
        timer.tick();
        timer.stop();
        assert_eq!(timer, TimerState::new());
        assert!(!timer.is_expired());
    }

    #[test]
    fn zero_minute_timer_never_expires_as_a_session() {
        let mut timer = TimerState::started(0);
        assert!(!timer.active());
        assert!(!timer.tick());
        assert!(!timer.is_expired());
    }

    #[test]
    fn display_and_fraction() {
        let mut timer = TimerState::started(2);
        assert_eq!(timer.display(), "02:00");
        for _ in 0..61 {
            timer.tick();
        }
        assert_eq!(timer.display(), "00:59");
        let fraction = timer.remaining_fraction().unwrap();
        assert!((fraction - 59.0 / 120.0).abs() < 1e-6);
        timer.stop();
        assert_eq!(timer.remaining_fraction(), None);
    }
}
