//! Shared point and color primitives used by the canvas and editor modules.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl<'de> Deserialize<'de> for CanvasPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (x, y) = <(f32, f32)>::deserialize(deserializer)?;
        Ok(Self::new(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Accepts `#RRGGBB` or bare `RRGGBB`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let red = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let green = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let blue = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(red, green, blue))
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_accepts_hash_or_plain_six_digit_hex() {
        assert_eq!(Color::from_hex("#FF6B6B"), Some(Color::new(255, 107, 107)));
        assert_eq!(Color::from_hex("48bb78"), Some(Color::new(72, 187, 120)));
    }

    #[test]
    fn from_hex_rejects_invalid_values() {
        assert_eq!(Color::from_hex("#FFF"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::from_hex(""), None);
    }

    #[test]
    fn color_and_point_deserialize_from_script_shapes() {
        let color: Color = serde_json::from_str("\"#000000\"").expect("color");
        assert_eq!(color, Color::new(0, 0, 0));

        let point: CanvasPoint = serde_json::from_str("[1.5, 2]").expect("point");
        assert_eq!(point, CanvasPoint::new(1.5, 2.0));

        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }
}
