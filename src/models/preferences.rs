use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureFlag {
    HistoryPanel,
    BreathOverlay,
    AnalogNoise,
}

impl std::str::FromStr for FeatureFlag {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "historyPanel" | "history-panel" => Ok(FeatureFlag::HistoryPanel),
            "breathOverlay" | "breath-overlay" => Ok(FeatureFlag::BreathOverlay),
            "analogNoise" | "analog-noise" => Ok(FeatureFlag::AnalogNoise),
            other => Err(format!("unknown feature flag '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub history_panel: bool,
    pub breath_overlay: bool,
    pub analog_noise: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            history_panel: true,
            breath_overlay: true,
            analog_noise: true,
        }
    }
}

impl FeatureFlags {
    pub fn get(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::HistoryPanel => self.history_panel,
            FeatureFlag::BreathOverlay => self.breath_overlay,
            FeatureFlag::AnalogNoise => self.analog_noise,
        }
    }

    pub fn set(&mut self, flag: FeatureFlag, value: bool) {
        let slot = match flag {
            FeatureFlag::HistoryPanel => &mut self.history_panel,
            FeatureFlag::BreathOverlay => &mut self.breath_overlay,
            FeatureFlag::AnalogNoise => &mut self.analog_noise,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolHint {
    Timer,
    Music,
    Immersive,
    Binaural,
    Keys,
    Breath,
    Calm,
    Ambience,
}

impl std::str::FromStr for ToolHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "timer" => Ok(ToolHint::Timer),
            "music" => Ok(ToolHint::Music),
            "immersive" => Ok(ToolHint::Immersive),
            "binaural" => Ok(ToolHint::Binaural),
            "keys" => Ok(ToolHint::Keys),
            "breath" => Ok(ToolHint::Breath),
            "calm" => Ok(ToolHint::Calm),
            "ambience" => Ok(ToolHint::Ambience),
            other => Err(format!("unknown tool hint '{other}'")),
        }
    }
}

/// One-shot "seen" markers. Once dismissed a hint stays dismissed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolHints {
    pub timer: bool,
    pub music: bool,
    pub immersive: bool,
    pub binaural: bool,
    pub keys: bool,
    pub breath: bool,
    pub calm: bool,
    pub ambience: bool,
}

impl ToolHints {
    fn slot(&mut self, hint: ToolHint) -> &mut bool {
        match hint {
            ToolHint::Timer => &mut self.timer,
            ToolHint::Music => &mut self.music,
            ToolHint::Immersive => &mut self.immersive,
            ToolHint::Binaural => &mut self.binaural,
            ToolHint::Keys => &mut self.keys,
            ToolHint::Breath => &mut self.breath,
            ToolHint::Calm => &mut self.calm,
            ToolHint::Ambience => &mut self.ambience,
        }
    }

    pub fn dismiss(&mut self, hint: ToolHint) {
        *self.slot(hint) = true;
    }

    pub fn is_dismissed(&self, hint: ToolHint) -> bool {
        let mut copy = *self;
        *copy.slot(hint)
    }
}
