//! RGB565 color codec.

use crate::Error;
use std::str::FromStr;

/// A 5-6-5 color as sent to the display.
///
/// Channels are masked to their bit width on construction, so out-of-range
/// input is silently truncated rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color565 {
    r: u8,
    g: u8,
    b: u8,
}

impl Color565 {
    pub const BLACK: Color565 = Color565::new(0, 0, 0);
    pub const WHITE: Color565 = Color565::new(0x1F, 0x3F, 0x1F);
    pub const RED: Color565 = Color565::new(0x1F, 0, 0);
    pub const GREEN: Color565 = Color565::new(0, 0x3F, 0);
    pub const BLUE: Color565 = Color565::new(0, 0, 0x1F);

    /// Creates a color from 5-bit red, 6-bit green and 5-bit blue channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r & 0x1F,
            g: g & 0x3F,
            b: b & 0x1F,
        }
    }

    /// Creates a color from 8-bit channels, dropping the low bits.
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self::new(r >> 3, g >> 2, b >> 3)
    }

    /// Unpacks a 16-bit RGB565 value.
    pub const fn from_u16(pixel: u16) -> Self {
        Self::new((pixel >> 11) as u8, (pixel >> 5) as u8, pixel as u8)
    }

    pub fn red(&self) -> u8 {
        self.r
    }

    pub fn green(&self) -> u8 {
        self.g
    }

    pub fn blue(&self) -> u8 {
        self.b
    }

    /// Packs the channels into a 16-bit word (red in bits 15-11).
    #[inline]
    pub const fn to_u16(self) -> u16 {
        ((self.r as u16) << 11) | ((self.g as u16) << 5) | self.b as u16
    }

    /// Serializes the color to its two wire bytes, high byte first.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 2] {
        self.to_u16().to_be_bytes()
    }

    /// Expands to 8-bit channels.
    pub fn to_rgb888(self) -> (u8, u8, u8) {
        let r8 = (self.r << 3) | (self.r >> 2);
        let g8 = (self.g << 2) | (self.g >> 4);
        let b8 = (self.b << 3) | (self.b >> 2);
        (r8, g8, b8)
    }

    /// Parses a `#RRGGBB` hex string.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::from_rgb888(r, g, b))
    }
}

impl From<Color565> for u16 {
    fn from(color: Color565) -> Self {
        color.to_u16()
    }
}

impl FromStr for Color565 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s).ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

impl std::fmt::Display for Color565 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (r, g, b) = self.to_rgb888();
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}
