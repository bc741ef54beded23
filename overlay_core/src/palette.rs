use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// 8-bit sRGB color used for every overlay draw command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `rgb(r,g,b)` or one of the few named colors the
    /// overlay config uses.
    pub fn parse(src: &str) -> Result<Self, ColorParseError> {
        let trimmed = src.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::Malformed(src.to_string()));
        }
        if let Some(body) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_triplet(body)
                .ok_or_else(|| ColorParseError::Malformed(src.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "white" => Ok(Color::WHITE),
            "black" => Ok(Color::BLACK),
            _ => Err(ColorParseError::Unknown(src.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_rgb_triplet(body: &str) -> Option<Color> {
    let mut parts = body.split(',').map(|part| part.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Color::rgb(r, g, b))
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("malformed color literal {0:?}")]
    Malformed(String),
    #[error("unknown color name {0:?}")]
    Unknown(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("efficiency palette must contain at least one color")]
pub struct EmptyPalette;

/// Discrete low→high color scale for efficiency values in `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Result<Self, EmptyPalette> {
        if colors.is_empty() {
            return Err(EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// `round((N - 1) * value / 100)`, clamped into the palette.
    pub fn index_for(&self, value: i32) -> usize {
        let last = self.colors.len() - 1;
        let scaled = (last as f64 * (value as f64 / 100.0)).round();
        scaled.clamp(0.0, last as f64) as usize
    }

    pub fn color_for(&self, value: i32) -> Color {
        self.colors[self.index_for(value)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::rgb(0xFF, 0x00, 0x00),
                Color::rgb(0xFF, 0x80, 0x00),
                Color::rgb(0xFF, 0xC0, 0x00),
                Color::rgb(0xFF, 0xFF, 0x00),
                Color::rgb(0xC0, 0xFF, 0x00),
                Color::rgb(0x00, 0xFF, 0x00),
            ],
        }
    }
}
