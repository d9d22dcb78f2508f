//! Geometry primitives and display resolution.
//!
//! Constructors never validate; coordinates are checked against a
//! [`DisplayConfig`] when a command is issued.

use crate::{Error, Result, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Largest dimension addressable with one-byte coordinates.
pub const MAX_DIMENSION: u16 = 256;

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl Point {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(x0: u8, y0: u8, x1: u8, y1: u8) -> Self {
        Self {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
        }
    }

    pub fn points(&self) -> [Point; 2] {
        [self.start, self.end]
    }
}

/// An axis-aligned rectangle given by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl Rect {
    /// Creates a rectangle from any two opposite corners.
    pub fn new(x0: u8, y0: u8, x1: u8, y1: u8) -> Self {
        Self::from_corners(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Creates a rectangle from two opposite corners, normalizing their order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            top_left: Point::new(a.x.min(b.x), a.y.min(b.y)),
            bottom_right: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn points(&self) -> [Point; 2] {
        [self.top_left, self.bottom_right]
    }

    /// Width in pixels, both edges inclusive.
    pub fn width(&self) -> u16 {
        self.bottom_right.x.abs_diff(self.top_left.x) as u16 + 1
    }

    /// Height in pixels, both edges inclusive.
    pub fn height(&self) -> u16 {
        self.bottom_right.y.abs_diff(self.top_left.y) as u16 + 1
    }
}

/// Resolution of the attached display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    width: u16,
    height: u16,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DISPLAY_WIDTH,
            height: DISPLAY_HEIGHT,
        }
    }
}

impl DisplayConfig {
    /// Creates a configuration, rejecting sizes the wire format cannot address.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        for (name, value) in [("width", width), ("height", height)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(Error::InvalidConfig(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_DIMENSION, value
                )));
            }
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Largest valid x coordinate.
    pub fn max_x(&self) -> u8 {
        (self.width - 1) as u8
    }

    /// Largest valid y coordinate.
    pub fn max_y(&self) -> u8 {
        (self.height - 1) as u8
    }

    /// Number of pixels in a full frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Length in bytes of a full-frame pixel stream.
    pub fn frame_len(&self) -> usize {
        self.pixel_count() * 2
    }

    pub fn contains(&self, point: Point) -> bool {
        (point.x as u16) < self.width && (point.y as u16) < self.height
    }

    /// Fails with [`Error::OutOfBounds`] for the first point outside the display.
    pub fn check(&self, points: &[Point]) -> Result<()> {
        match points.iter().find(|p| !self.contains(**p)) {
            Some(p) => Err(Error::OutOfBounds { x: p.x, y: p.y }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let rect = Rect::new(63, 40, 32, 0);
        assert_eq!(rect.top_left, Point::new(32, 0));
        assert_eq!(rect.bottom_right, Point::new(63, 40));
        assert_eq!(rect.width(), 32);
        assert_eq!(rect.height(), 41);
    }

    #[test]
    fn test_rect_size_with_reversed_literal_corners() {
        let rect = Rect {
            top_left: Point::new(10, 7),
            bottom_right: Point::new(5, 0),
        };
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 8);
    }

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.max_x(), 95);
        assert_eq!(config.max_y(), 63);
        assert_eq!(config.frame_len(), 96 * 64 * 2);
        assert_eq!(config.frame_len() % 2, 0);
    }

    #[test]
    fn test_config_limits() {
        assert!(DisplayConfig::new(0, 64).is_err());
        assert!(DisplayConfig::new(96, 257).is_err());
        let config = DisplayConfig::new(256, 256).unwrap();
        assert_eq!(config.max_x(), 255);
    }

    #[test]
    fn test_bounds_check() {
        let config = DisplayConfig::default();
        assert!(config.contains(Point::new(95, 63)));
        assert!(!config.contains(Point::new(96, 0)));
        assert_eq!(
            config.check(&[Point::new(0, 0), Point::new(10, 64)]),
            Err(Error::OutOfBounds { x: 10, y: 64 })
        );
        assert!(config.check(&Line::new(0, 0, 95, 63).points()).is_ok());
    }
}
