use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Day,
    Night,
}

impl std::str::FromStr for ThemeMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(ThemeMode::Auto),
            "day" => Ok(ThemeMode::Day),
            "night" => Ok(ThemeMode::Night),
            other => Err(format!("unknown theme mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub accent: &'static str,
}

const DAY_PALETTE: Palette = Palette {
    background: "#020617",
    accent: "#38bdf8",
};

const NIGHT_PALETTE: Palette = Palette {
    background: "#020108",
    accent: "#f97316",
};

/// Page palette for a theme mode at the given local hour (0..=23).
pub fn resolve_theme(mode: ThemeMode, local_hour: u32) -> Palette {
    match mode {
        ThemeMode::Day => DAY_PALETTE,
        ThemeMode::Night => NIGHT_PALETTE,
        ThemeMode::Auto if local_hour < 6 || local_hour >= 19 => NIGHT_PALETTE,
        ThemeMode::Auto => DAY_PALETTE,
    }
}
