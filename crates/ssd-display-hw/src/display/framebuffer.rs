//! Caller-side RGB565 pixel buffer.
//!
//! Pixels are stored as wire bytes, so a buffer can be streamed to the
//! display without conversion.

use crate::color::Color565;
use crate::geometry::{DisplayConfig, Point, Rect};
use crate::{Error, Result};

/// A full frame of big-endian RGB565 pixels in raster order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    config: DisplayConfig,
}

impl PixelBuffer {
    /// Allocates a black frame for the given display.
    pub fn new(config: DisplayConfig) -> Result<Self> {
        let len = config.frame_len();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed { bytes: len })?;
        data.resize(len, 0);
        Ok(Self { data, config })
    }

    /// Wraps pre-encoded wire bytes, such as a raw image file.
    pub fn from_bytes(config: DisplayConfig, data: Vec<u8>) -> Result<Self> {
        if data.len() != config.frame_len() {
            return Err(Error::FramebufferSize {
                expected: config.frame_len(),
                actual: data.len(),
            });
        }
        Ok(Self { data, config })
    }

    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    /// Returns the wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Fills the frame with a solid color.
    pub fn fill(&mut self, color: Color565) {
        let bytes = color.to_bytes();
        for pixel in self.data.chunks_exact_mut(2) {
            pixel.copy_from_slice(&bytes);
        }
    }

    /// Sets a pixel; points outside the frame are ignored.
    pub fn set_pixel(&mut self, point: Point, color: Color565) {
        if let Some(offset) = self.offset(point) {
            self.data[offset..offset + 2].copy_from_slice(&color.to_bytes());
        }
    }

    pub fn get_pixel(&self, point: Point) -> Option<Color565> {
        let offset = self.offset(point)?;
        let pixel = u16::from_be_bytes([self.data[offset], self.data[offset + 1]]);
        Some(Color565::from_u16(pixel))
    }

    /// Fills a rectangle, clipped to the frame.
    pub fn fill_rect(&mut self, rect: &Rect, color: Color565) {
        for y in rect.top_left.y..=rect.bottom_right.y {
            for x in rect.top_left.x..=rect.bottom_right.x {
                self.set_pixel(Point::new(x, y), color);
            }
        }
    }

    /// Renders every pixel from a function of its position.
    pub fn paint<F>(&mut self, mut color_at: F)
    where
        F: FnMut(Point) -> Color565,
    {
        for y in 0..=self.config.max_y() {
            for x in 0..=self.config.max_x() {
                let point = Point::new(x, y);
                self.set_pixel(point, color_at(point));
            }
        }
    }

    fn offset(&self, point: Point) -> Option<usize> {
        if !self.config.contains(point) {
            return None;
        }
        let idx = point.y as usize * self.config.width() as usize + point.x as usize;
        Some(idx * 2)
    }
}
