//! Cluster display colors.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// An sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Create a color from channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from the low 24 bits of `value` (`0xRRGGBB`).
    #[must_use]
    pub const fn from_rgb24(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_rgb24)
    }

    /// Convert from HSL. `hue` in degrees, `saturation` and `lightness` in `0..=1`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::many_single_char_names
    )]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let h = hue.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = lightness - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color '{value}', expected #rrggbb"))
    }
}

/// How new clusters are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Random 24-bit color per cluster, drawn from a seeded generator.
    #[default]
    Random,
    /// One fixed hue per player, spread evenly around the color wheel.
    PlayerHue,
}

/// Source of colors for freshly created clusters.
///
/// Random colors come from a seeded [`StdRng`], so two games built from the
/// same configuration color their clusters identically.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    scheme: ColorScheme,
    num_players: u8,
    rng: StdRng,
}

impl ColorPicker {
    /// Create a picker.
    #[must_use]
    pub fn new(scheme: ColorScheme, seed: u64, num_players: u8) -> Self {
        Self {
            scheme,
            num_players: num_players.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The active scheme.
    #[must_use]
    pub const fn scheme(&self) -> ColorScheme {
        self.scheme
    }

    /// Color for a new cluster owned by `player`.
    pub fn next(&mut self, player: PlayerId) -> Color {
        match self.scheme {
            ColorScheme::Random => Color::from_rgb24(self.rng.random_range(0..=0x00ff_ffff)),
            ColorScheme::PlayerHue => player_hue(player, self.num_players),
        }
    }
}

/// The fixed color of `player` under [`ColorScheme::PlayerHue`].
#[must_use]
pub fn player_hue(player: PlayerId, num_players: u8) -> Color {
    let hue = f64::from(player) * 360.0 / f64::from(num_players.max(1));
    Color::from_hsl(hue, 0.7, 0.5)
}
