//! Stateful display session.
//!
//! A session owns its transport and at most one open device handle, and
//! enforces the command/transfer state machine:
//!
//! ```text
//! Uninitialized --open--> Open --begin_pixel_transfer--> Transferring
//!                          ^                                  |
//!                          +----------end_transfer------------+
//! any state --free--> Closed
//! ```
//!
//! A failed operation leaves the state unchanged, so `free` is always safe.

use crate::color::Color565;
use crate::geometry::{DisplayConfig, Line, Point, Rect};
use crate::transport::{ErrorCode, Transport};
use crate::{Error, Result};
use tracing::{debug, info, warn};

use super::framebuffer::PixelBuffer;
use super::protocol::{
    build_begin_transfer_packet, build_box_packet, build_clear_packet, build_end_transfer_packet,
    build_line_packet,
};

/// Lifecycle state of a [`DisplaySession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, no device open.
    #[default]
    Uninitialized,
    /// Device open and accepting commands.
    Open,
    /// Between the begin and end transfer markers.
    Transferring,
    /// Released. Terminal.
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Open => write!(f, "open"),
            SessionState::Transferring => write!(f, "transferring"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// Display driver session.
///
/// Every operation performs at most one logical write and blocks until the
/// transport returns. Failures are recorded and returned, never retried.
pub struct DisplaySession<T: Transport> {
    transport: T,
    handle: Option<T::Handle>,
    config: DisplayConfig,
    state: SessionState,
    last_error: Option<Error>,
    /// Bytes streamed since the last begin marker.
    transferred: usize,
}

impl<T: Transport> DisplaySession<T> {
    /// Creates an unopened session. Performs no I/O.
    pub fn new(transport: T, config: DisplayConfig) -> Self {
        Self {
            transport,
            handle: None,
            config,
            state: SessionState::Uninitialized,
            last_error: None,
            transferred: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> DisplayConfig {
        self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the most recent failure, if any.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Describes the most recent failure, using the transport's wording for
    /// transport errors.
    pub fn last_error_string(&self) -> Option<String> {
        self.last_error.as_ref().map(|error| match error {
            Error::TransportOpenFailed(code) | Error::TransportWriteFailed(code) => {
                format!("{}: {}", error, self.transport.error_string(*code))
            }
            other => other.to_string(),
        })
    }

    /// Describes a status code returned by any session operation.
    pub fn error_string(&self, code: ErrorCode) -> String {
        match Error::describe_code(code) {
            Some(text) => text.to_string(),
            None => self.transport.error_string(code),
        }
    }

    /// Opens the device. On failure the session stays uninitialized and
    /// `open` may be retried.
    pub fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<()> {
        let result = self.try_open(vendor_id, product_id);
        self.record(result)
    }

    fn try_open(&mut self, vendor_id: u16, product_id: u16) -> Result<()> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Open | SessionState::Transferring => return Err(Error::AlreadyOpen),
            SessionState::Closed => return Err(Error::SessionClosed),
        }

        let handle = self
            .transport
            .open(vendor_id, product_id)
            .map_err(Error::TransportOpenFailed)?;

        self.handle = Some(handle);
        self.state = SessionState::Open;
        info!(
            "Display session opened (VID:{:04X} PID:{:04X}, {}x{})",
            vendor_id,
            product_id,
            self.config.width(),
            self.config.height()
        );
        Ok(())
    }

    /// Clears the whole display.
    pub fn clear_display(&mut self) -> Result<()> {
        let result = self.command(&[], &build_clear_packet());
        self.record(result)
    }

    /// Draws a line in a single color.
    pub fn draw_line(&mut self, line: Line, color: Color565) -> Result<()> {
        let result = self.command(&line.points(), &build_line_packet(&line, color));
        self.record(result)
    }

    /// Draws a rectangle with separate border and fill colors.
    pub fn draw_box(&mut self, rect: Rect, border: Color565, fill: Color565) -> Result<()> {
        let result = self.command(&rect.points(), &build_box_packet(&rect, border, fill));
        self.record(result)
    }

    /// Starts a pixel transfer.
    pub fn begin_pixel_transfer(&mut self) -> Result<()> {
        let result = self.try_begin_pixel_transfer();
        self.record(result)
    }

    fn try_begin_pixel_transfer(&mut self) -> Result<()> {
        self.require_open()?;
        self.write(&build_begin_transfer_packet())?;
        self.state = SessionState::Transferring;
        self.transferred = 0;
        debug!("Pixel transfer started");
        Ok(())
    }

    /// Streams raw RGB565 wire bytes. May be called repeatedly while
    /// transferring; an empty slice is a no-op.
    pub fn send_pixels(&mut self, bytes: &[u8]) -> Result<()> {
        let result = self.try_send_pixels(bytes);
        self.record(result)
    }

    fn try_send_pixels(&mut self, bytes: &[u8]) -> Result<()> {
        self.require_transferring()?;

        for chunk in bytes.chunks(self.transport.max_write_size().max(1)) {
            self.write(chunk)?;
            self.transferred += chunk.len();
        }

        if self.transferred > self.config.frame_len() {
            warn!(
                "Pixel transfer exceeds frame size ({} > {} bytes)",
                self.transferred,
                self.config.frame_len()
            );
        }
        Ok(())
    }

    /// Ends the pixel transfer and returns to the open state.
    pub fn end_transfer(&mut self) -> Result<()> {
        let result = self.try_end_transfer();
        self.record(result)
    }

    fn try_end_transfer(&mut self) -> Result<()> {
        self.require_transferring()?;
        self.write(&build_end_transfer_packet())?;
        self.state = SessionState::Open;
        debug!("Pixel transfer finished ({} bytes)", self.transferred);
        Ok(())
    }

    /// Uploads a whole frame in one transfer.
    pub fn send_frame(&mut self, frame: &PixelBuffer) -> Result<()> {
        if frame.config() != self.config {
            return self.record(Err(Error::FramebufferSize {
                expected: self.config.frame_len(),
                actual: frame.as_bytes().len(),
            }));
        }
        self.begin_pixel_transfer()?;
        self.send_pixels(frame.as_bytes())?;
        self.end_transfer()
    }

    /// Releases the session, closing the device if one is open.
    ///
    /// Valid from any state and idempotent; the transport is closed at most once.
    pub fn free(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.state == SessionState::Transferring {
            warn!("Releasing display session during a pixel transfer");
        }
        if let Some(handle) = self.handle.take() {
            self.transport.close(handle);
            info!("Display session released");
        }
        self.state = SessionState::Closed;
    }

    fn command(&mut self, points: &[Point], packet: &[u8]) -> Result<()> {
        self.require_open()?;
        self.config.check(points)?;
        self.write(packet)?;
        debug!("Command {:02X?} sent", packet);
        Ok(())
    }

    fn require_open(&self) -> Result<()> {
        match self.state {
            SessionState::Open => Ok(()),
            SessionState::Uninitialized => Err(Error::NotOpen),
            SessionState::Transferring => Err(Error::TransferInProgress),
            SessionState::Closed => Err(Error::SessionClosed),
        }
    }

    fn require_transferring(&self) -> Result<()> {
        match self.state {
            SessionState::Transferring => Ok(()),
            _ => Err(Error::NotTransferring),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let handle = self.handle.as_mut().ok_or(Error::NotOpen)?;
        self.transport
            .write(handle, bytes)
            .map_err(Error::TransportWriteFailed)
    }

    fn record(&mut self, result: Result<()>) -> Result<()> {
        if let Err(error) = &result {
            debug!("Display operation failed in state {}: {}", self.state, error);
            self.last_error = Some(error.clone());
        }
        result
    }
}

impl<T: Transport> Drop for DisplaySession<T> {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct StubLog {
        opened: Vec<(u16, u16)>,
        writes: Vec<Vec<u8>>,
        closes: usize,
    }

    #[derive(Default)]
    struct StubTransport {
        log: Rc<RefCell<StubLog>>,
        open_error: Option<ErrorCode>,
        write_error: Option<ErrorCode>,
        max_write: Option<usize>,
    }

    impl Transport for StubTransport {
        type Handle = u32;

        fn open(
            &mut self,
            vendor_id: u16,
            product_id: u16,
        ) -> std::result::Result<u32, ErrorCode> {
            self.log.borrow_mut().opened.push((vendor_id, product_id));
            match self.open_error.take() {
                Some(code) => Err(code),
                None => Ok(7),
            }
        }

        fn write(&mut self, handle: &mut u32, bytes: &[u8]) -> std::result::Result<(), ErrorCode> {
            assert_eq!(*handle, 7);
            if let Some(code) = self.write_error {
                return Err(code);
            }
            self.log.borrow_mut().writes.push(bytes.to_vec());
            Ok(())
        }

        fn close(&mut self, _handle: u32) {
            self.log.borrow_mut().closes += 1;
        }

        fn error_string(&self, code: ErrorCode) -> String {
            format!("stub error {}", code)
        }

        fn max_write_size(&self) -> usize {
            self.max_write.unwrap_or(usize::MAX)
        }
    }

    fn open_session() -> (DisplaySession<StubTransport>, Rc<RefCell<StubLog>>) {
        let transport = StubTransport::default();
        let log = transport.log.clone();
        let mut session = DisplaySession::new(transport, DisplayConfig::default());
        session.open(0x0403, 0x6010).unwrap();
        (session, log)
    }

    #[test]
    fn test_end_to_end_two_pixels() {
        let (mut session, log) = open_session();
        let mut pixels = Vec::new();
        pixels.extend_from_slice(&Color565::new(31, 0, 0).to_bytes());
        pixels.extend_from_slice(&Color565::new(0, 0, 31).to_bytes());

        session.clear_display().unwrap();
        session.begin_pixel_transfer().unwrap();
        session.send_pixels(&pixels).unwrap();
        session.end_transfer().unwrap();
        session.free();

        let log = log.borrow();
        assert_eq!(
            log.writes,
            vec![
                vec![0x25u8],
                vec![0x5C],
                vec![0xF8, 0x00, 0x00, 0x1F],
                vec![0x5D]
            ]
        );
        assert_eq!(log.closes, 1);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_open_failure_allows_retry() {
        let transport = StubTransport {
            open_error: Some(ErrorCode(-5)),
            ..StubTransport::default()
        };
        let log = transport.log.clone();
        let mut session = DisplaySession::new(transport, DisplayConfig::default());

        assert_eq!(
            session.open(0x0403, 0x6010),
            Err(Error::TransportOpenFailed(ErrorCode(-5)))
        );
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(
            session.last_error_string().unwrap(),
            "Failed to open display device (transport code -5): stub error -5"
        );

        session.open(0x0403, 0x6014).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(log.borrow().opened, vec![(0x0403, 0x6010), (0x0403, 0x6014)]);
    }

    #[test]
    fn test_open_twice_is_rejected() {
        let (mut session, log) = open_session();
        assert_eq!(session.open(0x0403, 0x6010), Err(Error::AlreadyOpen));
        session.begin_pixel_transfer().unwrap();
        assert_eq!(session.open(0x0403, 0x6010), Err(Error::AlreadyOpen));
        assert_eq!(log.borrow().opened.len(), 1);
    }

    #[test]
    fn test_send_pixels_requires_transfer() {
        let mut session = DisplaySession::new(StubTransport::default(), DisplayConfig::default());
        assert_eq!(session.send_pixels(&[0, 0]), Err(Error::NotTransferring));

        session.open(1, 2).unwrap();
        assert_eq!(session.send_pixels(&[0, 0]), Err(Error::NotTransferring));

        session.free();
        assert_eq!(session.send_pixels(&[0, 0]), Err(Error::NotTransferring));
        assert_eq!(session.last_error(), Some(&Error::NotTransferring));
    }

    #[test]
    fn test_empty_transfer_returns_to_open() {
        let (mut session, log) = open_session();
        session.begin_pixel_transfer().unwrap();
        session.end_transfer().unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(log.borrow().writes, vec![vec![0x5Cu8], vec![0x5D]]);
    }

    #[test]
    fn test_commands_rejected_outside_open() {
        let mut session = DisplaySession::new(StubTransport::default(), DisplayConfig::default());
        assert_eq!(session.clear_display(), Err(Error::NotOpen));
        assert_eq!(session.begin_pixel_transfer(), Err(Error::NotOpen));
        assert_eq!(session.end_transfer(), Err(Error::NotTransferring));

        session.open(1, 2).unwrap();
        session.begin_pixel_transfer().unwrap();
        assert_eq!(session.begin_pixel_transfer(), Err(Error::TransferInProgress));
        assert_eq!(
            session.draw_line(Line::new(0, 0, 1, 1), Color565::RED),
            Err(Error::TransferInProgress)
        );
        assert_eq!(session.state(), SessionState::Transferring);

        session.free();
        assert_eq!(session.clear_display(), Err(Error::SessionClosed));
        assert_eq!(session.open(1, 2), Err(Error::SessionClosed));
    }

    #[test]
    fn test_free_is_idempotent() {
        let (mut session, log) = open_session();
        session.free();
        session.free();
        assert_eq!(session.state(), SessionState::Closed);
        drop(session);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn test_free_without_open_does_not_close() {
        let transport = StubTransport::default();
        let log = transport.log.clone();
        let mut session = DisplaySession::new(transport, DisplayConfig::default());
        session.free();
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(log.borrow().closes, 0);
    }

    #[test]
    fn test_drop_closes_device() {
        let (session, log) = open_session();
        drop(session);
        assert_eq!(log.borrow().closes, 1);
    }

    #[test]
    fn test_write_failure_keeps_state() {
        let (mut session, _log) = open_session();
        session.transport.write_error = Some(ErrorCode(-1));

        assert_eq!(
            session.clear_display(),
            Err(Error::TransportWriteFailed(ErrorCode(-1)))
        );
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(
            session.begin_pixel_transfer(),
            Err(Error::TransportWriteFailed(ErrorCode(-1)))
        );
        assert_eq!(session.state(), SessionState::Open);

        session.transport.write_error = None;
        session.begin_pixel_transfer().unwrap();
        session.transport.write_error = Some(ErrorCode(-7));
        assert!(session.send_pixels(&[1, 2]).is_err());
        assert!(session.end_transfer().is_err());
        assert_eq!(session.state(), SessionState::Transferring);
        assert_eq!(
            session.last_error(),
            Some(&Error::TransportWriteFailed(ErrorCode(-7)))
        );
    }

    #[test]
    fn test_geometry_out_of_bounds() {
        let (mut session, log) = open_session();
        assert_eq!(
            session.draw_line(Line::new(0, 0, 96, 10), Color565::RED),
            Err(Error::OutOfBounds { x: 96, y: 10 })
        );
        assert_eq!(
            session.draw_box(Rect::new(0, 0, 95, 64), Color565::RED, Color565::RED),
            Err(Error::OutOfBounds { x: 95, y: 64 })
        );
        assert!(log.borrow().writes.is_empty());

        session
            .draw_box(Rect::new(0, 0, 31, 63), Color565::new(0x10, 0, 0), Color565::BLUE)
            .unwrap();
        assert_eq!(
            log.borrow().writes[0],
            vec![0x22u8, 0, 0, 31, 63, 0x80, 0x00, 0x00, 0x1F]
        );
    }

    #[test]
    fn test_send_pixels_is_chunked() {
        let (mut session, log) = open_session();
        session.transport.max_write = Some(3);
        let data: Vec<u8> = (0..8).collect();

        session.begin_pixel_transfer().unwrap();
        session.send_pixels(&data).unwrap();
        session.send_pixels(&[]).unwrap();
        session.end_transfer().unwrap();

        let log = log.borrow();
        let pixel_writes = &log.writes[1..log.writes.len() - 1];
        assert_eq!(
            pixel_writes.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![3, 3, 2]
        );
        assert_eq!(pixel_writes.concat(), data);
    }

    #[test]
    fn test_incremental_stream_within_frame_budget() {
        let (mut session, log) = open_session();
        let frame_len = session.config().frame_len();
        let sizes = [1, 2, 3, 500, 4096, frame_len - 4602];

        session.begin_pixel_transfer().unwrap();
        for size in sizes {
            session.send_pixels(&vec![0xAB; size]).unwrap();
        }
        session.end_transfer().unwrap();

        let total: usize = log.borrow().writes[1..=sizes.len()].iter().map(Vec::len).sum();
        assert_eq!(total, frame_len);
    }

    #[test]
    fn test_send_frame() {
        let (mut session, log) = open_session();
        let mut frame = PixelBuffer::new(DisplayConfig::default()).unwrap();
        frame.fill(Color565::RED);
        session.send_frame(&frame).unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(log.borrow().writes[1], frame.as_bytes());

        let small = PixelBuffer::new(DisplayConfig::new(2, 2).unwrap()).unwrap();
        assert!(matches!(
            session.send_frame(&small),
            Err(Error::FramebufferSize { .. })
        ));
    }

    #[test]
    fn test_error_string() {
        let session = DisplaySession::new(StubTransport::default(), DisplayConfig::default());
        assert_eq!(
            session.error_string(Error::NotTransferring.code()),
            "no pixel transfer in progress"
        );
        assert_eq!(session.error_string(ErrorCode(-5)), "stub error -5");
    }
}
