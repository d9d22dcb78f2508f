//! SSD Display Hardware Library
//!
//! Driver for SSD-class RGB565 displays (96x64 SSD1331 panels and friends)
//! attached to the host through an FTDI USB-serial bridge.

pub mod color;
pub mod display;
pub mod error;
pub mod geometry;
pub mod transport;

pub use color::Color565;
pub use display::{DisplaySession, PixelBuffer, SessionState};
pub use error::{Error, Result};
pub use geometry::{DisplayConfig, Line, Point, Rect};
pub use transport::{ErrorCode, SerialConfig, SerialTransport, Transport};

/// Default display dimensions
pub const DISPLAY_WIDTH: u16 = 96;
pub const DISPLAY_HEIGHT: u16 = 64;

/// USB VID:PID of the FT2232H bridge driving the display
pub const FTDI_VID: u16 = 0x0403;
pub const FTDI_PID: u16 = 0x6010;
