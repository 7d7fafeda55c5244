use serde::{Deserialize, Serialize};

/// Distinct calendar days with at least one completed session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub streak_days: u32,
    pub last_focus_day: Option<String>,
}

impl StreakState {
    /// Counts `today` toward the streak. At most one increment per day; gaps
    /// neither reset nor catch up.
    pub fn record_focus_day(&mut self, today: &str) -> bool {
        let counted = self.last_focus_day.as_deref() != Some(today);
        if counted {
            self.streak_days = match self.last_focus_day {
                Some(_) => self.streak_days.saturating_add(1),
                None => 1,
            };
        }
        self.last_focus_day = Some(today.to_string());
        counted
    }
}
