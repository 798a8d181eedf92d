//! Colors, flame color schemes and radial gradients

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlameError;

/// 24-bit RGB color, (de)serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation between two colors
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgb(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl FromStr for Color {
    type Err = FlameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FlameError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = FlameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Three-stop flame palette: inner, middle, outer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub colors: [Color; 3],
}

impl ColorScheme {
    pub fn new(name: impl Into<String>, colors: [Color; 3]) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Classic orange/yellow flame
    pub fn fire() -> Self {
        Self::new(
            "fire",
            [
                Color::rgb(0xFF, 0x33, 0x00),
                Color::rgb(0xFF, 0x66, 0x00),
                Color::rgb(0xFF, 0xCC, 0x00),
            ],
        )
    }

    /// Blue/violet flame
    pub fn arcane() -> Self {
        Self::new(
            "arcane",
            [
                Color::rgb(0x00, 0xAA, 0xFF),
                Color::rgb(0x55, 0x00, 0xFF),
                Color::rgb(0xCC, 0x00, 0xFF),
            ],
        )
    }

    /// Radial gradient for a disc centered at (cx, cy), stops at 0, 0.5 and 1
    pub fn gradient(&self, cx: f32, cy: f32, radius: f32) -> RadialGradient {
        let mut gradient = RadialGradient::new(cx, cy, radius);
        gradient.add_color_stop(0.0, self.colors[0]);
        gradient.add_color_stop(0.5, self.colors[1]);
        gradient.add_color_stop(1.0, self.colors[2]);
        gradient
    }
}

/// The built-in scheme list, in color-mode order
pub fn default_schemes() -> Vec<ColorScheme> {
    vec![ColorScheme::fire(), ColorScheme::arcane()]
}

/// Radial gradient from the center (offset 0) out to `radius` (offset 1)
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    stops: Vec<(f32, Color)>,
}

impl RadialGradient {
    pub fn new(cx: f32, cy: f32, radius: f32) -> Self {
        Self {
            cx,
            cy,
            radius,
            stops: Vec::with_capacity(3),
        }
    }

    /// Add a stop; offsets are clamped to [0, 1] and kept sorted
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        let idx = self.stops.partition_point(|(o, _)| *o <= offset);
        self.stops.insert(idx, (offset, color));
    }

    pub fn stops(&self) -> &[(f32, Color)] {
        &self.stops
    }

    /// Color at normalized offset `t` (0 = center, 1 = edge)
    pub fn color_at(&self, t: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::BLACK,
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t <= o1 {
                let span = o1 - o0;
                if span <= 0.0 {
                    return c1;
                }
                return c0.lerp(c1, (t - o0) / span);
            }
        }
        last.1
    }

    /// Color at pixel distance `dist` from the center
    #[inline]
    pub fn color_at_distance(&self, dist: f32) -> Color {
        if self.radius <= 0.0 {
            return self.color_at(1.0);
        }
        self.color_at(dist / self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        let c: Color = "#FF6600".parse().unwrap();
        assert_eq!(c, Color::rgb(255, 102, 0));
        let lower: Color = "#cc00ff".parse().unwrap();
        assert_eq!(lower, Color::rgb(0xCC, 0x00, 0xFF));
        assert_eq!(c.to_string(), "#FF6600");
    }

    #[test]
    fn test_reject_bad_colors() {
        for bad in ["FF6600", "#FF66", "#GG0000", "#FF66001", ""] {
            assert!(bad.parse::<Color>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_scheme_json_uses_hex_strings() {
        let json = serde_json::to_string(&ColorScheme::fire()).unwrap();
        assert!(json.contains("\"#FF3300\""));
        let back: ColorScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ColorScheme::fire());
    }

    #[test]
    fn test_gradient_stops_from_scheme() {
        let scheme = ColorScheme::arcane();
        let g = scheme.gradient(10.0, 20.0, 5.0);
        let offsets: Vec<f32> = g.stops().iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
        assert_eq!(g.color_at(0.0), scheme.colors[0]);
        assert_eq!(g.color_at(0.5), scheme.colors[1]);
        assert_eq!(g.color_at(1.0), scheme.colors[2]);
    }

    #[test]
    fn test_gradient_interpolates_between_stops() {
        let mut g = RadialGradient::new(0.0, 0.0, 10.0);
        g.add_color_stop(1.0, Color::rgb(200, 0, 0));
        g.add_color_stop(0.0, Color::rgb(0, 0, 0));
        assert_eq!(g.color_at(0.5), Color::rgb(100, 0, 0));
        assert_eq!(g.color_at_distance(5.0), Color::rgb(100, 0, 0));
        assert_eq!(g.color_at(2.0), Color::rgb(200, 0, 0));
    }

    #[test]
    fn test_empty_gradient_is_black() {
        let g = RadialGradient::new(0.0, 0.0, 1.0);
        assert_eq!(g.color_at(0.3), Color::BLACK);
    }
}
