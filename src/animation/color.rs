use std::fmt;

/// Linear RGB colour with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parses `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn parse_hex(value: &str) -> Option<Rgb> {
        let hex = value.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };

        let channel = |i: usize| -> Option<f32> {
            let byte = u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok()?;
            Some(byte as f32 / 255.0)
        };

        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn lerp(self, target: Rgb, alpha: f32) -> Rgb {
        let t = alpha.clamp(0.0, 1.0);
        Rgb {
            r: self.r + (target.r - self.r) * t,
            g: self.g + (target.g - self.g) * t,
            b: self.b + (target.b - self.b) * t,
        }
    }

    pub fn to_hex(self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::parse_hex("#ffffff"), Some(Rgb { r: 1.0, g: 1.0, b: 1.0 }));
        assert_eq!(Rgb::parse_hex("#000"), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse_hex("38bdf8").map(Rgb::to_hex).as_deref(), Some("#38bdf8"));
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#gggggg"), None);
    }

    #[test]
    fn lerp_is_clamped() {
        let white = Rgb { r: 1.0, g: 1.0, b: 1.0 };
        assert_eq!(Rgb::BLACK.lerp(white, 0.5).to_hex(), "#808080");
        assert_eq!(Rgb::BLACK.lerp(white, 3.0), white);
    }
}
