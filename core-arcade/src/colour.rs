use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColourError {
    #[error("colour {0:?} is not of the form #rrggbb")]
    Malformed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(packed: u32) -> Self {
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColourError> {
        let malformed = || ColourError::Malformed(hex.to_owned());

        let digits = hex.strip_prefix('#').ok_or_else(malformed)?;

        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }

        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|_| malformed())
    }

    /// Linear interpolation towards `other`, rounding each channel.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| {
            let (a, b) = (f32::from(a), f32::from(b));
            (a + t * (b - a)).round() as u8
        };

        Self::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    /// Composites `over` on top of `self` with the given opacity.
    pub fn blend(self, over: Self, alpha: f32) -> Self {
        self.lerp(over, alpha)
    }

    pub const fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba {
            colour: self,
            alpha,
        }
    }
}

impl FromStr for Rgb {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub colour: Rgb,
    pub alpha: f32,
}

impl From<Rgb> for Rgba {
    fn from(colour: Rgb) -> Self {
        colour.with_alpha(1.0)
    }
}
