//! Transport abstraction.
//!
//! The transport is the only layer that performs blocking I/O against the
//! device. Failures are reported as negative native codes and are never
//! interpreted or retried here.

mod serial;

pub use serial::{SerialConfig, SerialTransport};

/// Negative status code reported by a transport or the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i32);

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

/// A byte link to the display controller.
///
/// Native error codes must be negative and outside
/// [`DRIVER_CODES`](crate::error::DRIVER_CODES) (`-110..=-101`); codes in that
/// range are described as driver errors by the session.
pub trait Transport {
    /// An open connection to one device.
    type Handle;

    /// Opens the first device matching the USB vendor and product IDs.
    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Self::Handle, ErrorCode>;

    /// Writes all of `bytes`, blocking until done or failed.
    fn write(&mut self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), ErrorCode>;

    /// Closes a connection. Failures are not reported.
    fn close(&mut self, handle: Self::Handle);

    /// Human-readable description of a native error code.
    fn error_string(&self, code: ErrorCode) -> String;

    /// Largest number of bytes accepted by a single `write`.
    fn max_write_size(&self) -> usize {
        usize::MAX
    }
}
