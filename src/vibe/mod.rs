pub mod catalog;
pub mod share;
pub mod theme;

pub use catalog::{PresetId, SessionPreset, DEFAULT_STRESS_LEVEL};
pub use theme::{resolve_theme, Palette, ThemeMode};

use serde::{Deserialize, Deserializer, Serialize};

const DEFAULT_PAN_DRIFT_SPEED: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BinauralMode {
    #[default]
    Off,
    Focus,
    Calm,
    Sleep,
}

impl BinauralMode {
    /// Left/right frequency offset for this mode, `None` when the mode is off.
    pub fn beat_hz(self) -> Option<f32> {
        match self {
            BinauralMode::Off => None,
            BinauralMode::Focus => Some(40.0),
            BinauralMode::Calm => Some(10.0),
            BinauralMode::Sleep => Some(4.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Colors {
    #[serde(rename = "bg")]
    pub background: String,
    pub accent: String,
    #[serde(rename = "orb")]
    pub orb_color: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ShapeParams {
    pub distort: f32,
    pub speed: f32,
    pub roughness: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SoundParams {
    pub frequency: f32,
    #[serde(default)]
    pub wave_type: WaveType,
    #[serde(default)]
    pub binaural_mode: BinauralMode,
    /// Stereo drift in rad/s.
    #[serde(default = "default_pan_drift_speed")]
    pub pan_drift_speed: f32,
}

fn default_pan_drift_speed() -> f32 {
    DEFAULT_PAN_DRIFT_SPEED
}

/// A named mood preset. Catalog entries, classifier output and shared links all
/// end up as one of these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VibeDescriptor {
    pub name: String,
    pub colors: Colors,
    pub shape_params: ShapeParams,
    pub sound_params: SoundParams,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggested_ritual: String,
    #[serde(
        default = "default_stress_level",
        deserialize_with = "deserialize_stress_level"
    )]
    pub stress_level: u8,
}

fn default_stress_level() -> u8 {
    DEFAULT_STRESS_LEVEL
}

fn deserialize_stress_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_stress_level).unwrap_or(DEFAULT_STRESS_LEVEL))
}

/// Maps an arbitrary numeric stress value into 0..=100.
pub fn clamp_stress_level(raw: f64) -> u8 {
    if raw.is_nan() {
        return DEFAULT_STRESS_LEVEL;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

impl VibeDescriptor {
    /// Shallow merge: every field present in the patch replaces the whole field.
    pub fn apply_patch(&mut self, patch: VibePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(shape_params) = patch.shape_params {
            self.shape_params = shape_params;
        }
        if let Some(sound_params) = patch.sound_params {
            self.sound_params = sound_params;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(ritual) = patch.suggested_ritual {
            self.suggested_ritual = ritual;
        }
        if let Some(stress_level) = patch.stress_level {
            self.stress_level = stress_level.min(100);
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VibePatch {
    pub name: Option<String>,
    pub colors: Option<Colors>,
    pub shape_params: Option<ShapeParams>,
    pub sound_params: Option<SoundParams>,
    pub message: Option<String>,
    pub suggested_ritual: Option<String>,
    pub stress_level: Option<u8>,
}

impl From<VibeDescriptor> for VibePatch {
    fn from(vibe: VibeDescriptor) -> Self {
        Self {
            name: Some(vibe.name),
            colors: Some(vibe.colors),
            shape_params: Some(vibe.shape_params),
            sound_params: Some(vibe.sound_params),
            message: Some(vibe.message),
            suggested_ritual: Some(vibe.suggested_ritual),
            stress_level: Some(vibe.stress_level),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmbienceChannel {
    Rain,
    Cafe,
    White,
}

impl AmbienceChannel {
    pub const ALL: [AmbienceChannel; 3] = [
        AmbienceChannel::Rain,
        AmbienceChannel::Cafe,
        AmbienceChannel::White,
    ];
}

impl std::str::FromStr for AmbienceChannel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "rain" => Ok(AmbienceChannel::Rain),
            "cafe" => Ok(AmbienceChannel::Cafe),
            "white" => Ok(AmbienceChannel::White),
            other => Err(format!("unknown ambience channel '{other}'")),
        }
    }
}

/// Background noise levels, each expected in 0..=1. Callers own the range.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Ambience {
    pub rain: f32,
    pub cafe: f32,
    pub white: f32,
}

impl Ambience {
    pub const fn new(rain: f32, cafe: f32, white: f32) -> Self {
        Self { rain, cafe, white }
    }

    pub fn level(&self, channel: AmbienceChannel) -> f32 {
        match channel {
            AmbienceChannel::Rain => self.rain,
            AmbienceChannel::Cafe => self.cafe,
            AmbienceChannel::White => self.white,
        }
    }

    pub fn merge(&mut self, patch: AmbiencePatch) {
        if let Some(rain) = patch.rain {
            self.rain = rain;
        }
        if let Some(cafe) = patch.cafe {
            self.cafe = cafe;
        }
        if let Some(white) = patch.white {
            self.white = white;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmbiencePatch {
    pub rain: Option<f32>,
    pub cafe: Option<f32>,
    pub white: Option<f32>,
}

impl AmbiencePatch {
    pub fn channel(channel: AmbienceChannel, level: f32) -> Self {
        let mut patch = Self::default();
        match channel {
            AmbienceChannel::Rain => patch.rain = Some(level),
            AmbienceChannel::Cafe => patch.cafe = Some(level),
            AmbienceChannel::White => patch.white = Some(level),
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_fall_back_to_defaults() {
        let json = r##"{
            "name": "Handmade",
            "colors": { "bg": "#000000", "accent": "#ffffff", "orb": "#123456" },
            "shapeParams": { "distort": 0.2, "speed": 1.0, "roughness": 0.1 },
            "soundParams": { "frequency": 72 }
        }"##;

        let vibe: VibeDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(vibe.stress_level, DEFAULT_STRESS_LEVEL);
        assert_eq!(vibe.sound_params.wave_type, WaveType::Sine);
        assert_eq!(vibe.sound_params.binaural_mode, BinauralMode::Off);
        assert!((vibe.sound_params.pan_drift_speed - 0.1).abs() < f32::EPSILON);
        assert!(vibe.message.is_empty());
    }

    #[test]
    fn stress_level_is_clamped_on_the_way_in() {
        let mut value = serde_json::to_value(catalog::default_vibe()).unwrap();
        value["stressLevel"] = serde_json::json!(250);
        let high: VibeDescriptor = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(high.stress_level, 100);

        value["stressLevel"] = serde_json::json!(-4);
        let low: VibeDescriptor = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(low.stress_level, 0);

        value["stressLevel"] = serde_json::Value::Null;
        let absent: VibeDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(absent.stress_level, DEFAULT_STRESS_LEVEL);
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let mut vibe = catalog::default_vibe();
        let original_colors = vibe.colors.clone();
        vibe.apply_patch(VibePatch {
            name: Some("Renamed".into()),
            stress_level: Some(55),
            ..VibePatch::default()
        });

        assert_eq!(vibe.name, "Renamed");
        assert_eq!(vibe.stress_level, 55);
        assert_eq!(vibe.colors, original_colors);
    }

    #[test]
    fn ambience_merge_keeps_untouched_channels() {
        let mut ambience = Ambience::new(0.1, 0.2, 0.3);
        ambience.merge(AmbiencePatch::channel(AmbienceChannel::Cafe, 0.9));
        assert_eq!(ambience, Ambience::new(0.1, 0.9, 0.3));
    }

    #[test]
    fn binaural_beats_per_mode() {
        assert_eq!(BinauralMode::Off.beat_hz(), None);
        assert_eq!(BinauralMode::Focus.beat_hz(), Some(40.0));
        assert_eq!(BinauralMode::Calm.beat_hz(), Some(10.0));
        assert_eq!(BinauralMode::Sleep.beat_hz(), Some(4.0));
    }
}
