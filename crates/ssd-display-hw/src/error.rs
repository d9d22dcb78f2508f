//! Error types for the SSD display driver.

use crate::transport::ErrorCode;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving the display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The transport could not open the device.
    #[error("Failed to open display device (transport code {0})")]
    TransportOpenFailed(ErrorCode),

    /// The transport rejected a write.
    #[error("Failed to write to display device (transport code {0})")]
    TransportWriteFailed(ErrorCode),

    /// `open` was called on a session that already holds a device.
    #[error("Display session is already open")]
    AlreadyOpen,

    /// A command was issued before the device was opened.
    #[error("Display session is not open")]
    NotOpen,

    /// Pixel data or an end marker was sent outside a pixel transfer.
    #[error("No pixel transfer in progress")]
    NotTransferring,

    /// A command was issued while a pixel transfer is in progress.
    #[error("Pixel transfer already in progress")]
    TransferInProgress,

    /// The session has been released.
    #[error("Display session is closed")]
    SessionClosed,

    /// A pixel buffer could not be allocated.
    #[error("Failed to allocate {bytes} bytes")]
    AllocationFailed { bytes: usize },

    /// A coordinate lies outside the display.
    #[error("Coordinate ({x}, {y}) is outside the display")]
    OutOfBounds { x: u8, y: u8 },

    /// Pixel buffer size mismatch.
    #[error("Pixel buffer size mismatch: expected {expected}, got {actual}")]
    FramebufferSize { expected: usize, actual: usize },

    /// Invalid display configuration.
    #[error("Invalid display configuration: {0}")]
    InvalidConfig(String),

    /// Color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Codes reserved for driver-level errors. Transports must not report these.
pub const DRIVER_CODES: std::ops::RangeInclusive<i32> = INVALID_COLOR..=ALREADY_OPEN;

const ALREADY_OPEN: i32 = -101;
const NOT_OPEN: i32 = -102;
const NOT_TRANSFERRING: i32 = -103;
const TRANSFER_IN_PROGRESS: i32 = -104;
const SESSION_CLOSED: i32 = -105;
const ALLOCATION_FAILED: i32 = -106;
const OUT_OF_BOUNDS: i32 = -107;
const FRAMEBUFFER_SIZE: i32 = -108;
const INVALID_CONFIG: i32 = -109;
const INVALID_COLOR: i32 = -110;

impl Error {
    /// Returns the negative status code for this error.
    ///
    /// Transport failures carry the transport's native code; driver-level
    /// failures use codes in `-110..=-101`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::TransportOpenFailed(code) | Error::TransportWriteFailed(code) => *code,
            Error::AlreadyOpen => ErrorCode(ALREADY_OPEN),
            Error::NotOpen => ErrorCode(NOT_OPEN),
            Error::NotTransferring => ErrorCode(NOT_TRANSFERRING),
            Error::TransferInProgress => ErrorCode(TRANSFER_IN_PROGRESS),
            Error::SessionClosed => ErrorCode(SESSION_CLOSED),
            Error::AllocationFailed { .. } => ErrorCode(ALLOCATION_FAILED),
            Error::OutOfBounds { .. } => ErrorCode(OUT_OF_BOUNDS),
            Error::FramebufferSize { .. } => ErrorCode(FRAMEBUFFER_SIZE),
            Error::InvalidConfig(_) => ErrorCode(INVALID_CONFIG),
            Error::InvalidColor(_) => ErrorCode(INVALID_COLOR),
        }
    }

    /// Describes a driver-level code, or `None` if the code belongs to the transport.
    pub fn describe_code(code: ErrorCode) -> Option<&'static str> {
        let text = match code.0 {
            ALREADY_OPEN => "display session is already open",
            NOT_OPEN => "display session is not open",
            NOT_TRANSFERRING => "no pixel transfer in progress",
            TRANSFER_IN_PROGRESS => "pixel transfer already in progress",
            SESSION_CLOSED => "display session is closed",
            ALLOCATION_FAILED => "memory allocation failed",
            OUT_OF_BOUNDS => "coordinate outside the display",
            FRAMEBUFFER_SIZE => "pixel buffer size mismatch",
            INVALID_CONFIG => "invalid display configuration",
            INVALID_COLOR => "invalid color",
            _ => return None,
        };
        Some(text)
    }
}
