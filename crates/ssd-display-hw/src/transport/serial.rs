//! FTDI bridge access through the host's USB serial driver.

use super::{ErrorCode, Transport};
use std::io::Write;
use std::time::Duration;
use tokio_serial::{
    ClearBuffer, DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType,
    StopBits,
};
use tracing::{debug, info, warn};

pub const WRITE_FAILED: ErrorCode = ErrorCode(-1);
pub const ENUMERATION_FAILED: ErrorCode = ErrorCode(-2);
pub const DEVICE_NOT_FOUND: ErrorCode = ErrorCode(-3);
pub const OPEN_FAILED: ErrorCode = ErrorCode(-4);
pub const PERMISSION_DENIED: ErrorCode = ErrorCode(-5);
pub const CONFIG_FAILED: ErrorCode = ErrorCode(-6);
pub const WRITE_TIMEOUT: ErrorCode = ErrorCode(-7);
pub const DISCONNECTED: ErrorCode = ErrorCode(-8);

/// Serial link settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line rate in baud.
    pub baud_rate: u32,
    /// How long a single write may block.
    pub write_timeout: Duration,
    /// Largest chunk handed to the driver per write.
    pub max_write_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 3_000_000,
            write_timeout: Duration::from_millis(1000),
            max_write_size: 4096,
        }
    }
}

/// Transport backed by the serial port an FTDI bridge exposes.
pub struct SerialTransport {
    config: SerialConfig,
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new(SerialConfig::default())
    }
}

impl SerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Transport for SerialTransport {
    type Handle = Box<dyn SerialPort>;

    fn open(&mut self, vendor_id: u16, product_id: u16) -> Result<Self::Handle, ErrorCode> {
        let ports = tokio_serial::available_ports().map_err(|e| {
            debug!("Failed to enumerate serial ports: {}", e);
            ENUMERATION_FAILED
        })?;

        let port_info = select_port(ports, vendor_id, product_id).ok_or(DEVICE_NOT_FOUND)?;

        let port = tokio_serial::new(&port_info.port_name, self.config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.config.write_timeout)
            .open()
            .map_err(|e| {
                debug!("Failed to open {}: {}", port_info.port_name, e);
                open_error_code(&e.kind)
            })?;

        port.clear(ClearBuffer::All).map_err(|e| {
            debug!("Failed to purge buffers on {}: {}", port_info.port_name, e);
            CONFIG_FAILED
        })?;

        info!(
            "Display bridge opened (VID:{:04X} PID:{:04X}, port={}, baud={})",
            vendor_id, product_id, port_info.port_name, self.config.baud_rate
        );

        Ok(port)
    }

    fn write(&mut self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), ErrorCode> {
        handle.write_all(bytes).map_err(|e| {
            debug!("Serial write of {} bytes failed: {}", bytes.len(), e);
            write_error_code(e.kind())
        })
    }

    fn close(&mut self, mut handle: Self::Handle) {
        if let Err(e) = handle.flush() {
            warn!("Failed to flush display bridge on close: {}", e);
        }
        debug!("Display bridge closed");
    }

    fn error_string(&self, code: ErrorCode) -> String {
        let text = match code {
            WRITE_FAILED => "usb bulk write failed",
            ENUMERATION_FAILED => "failed to enumerate usb serial devices",
            DEVICE_NOT_FOUND => "usb device not found",
            OPEN_FAILED => "unable to open device",
            PERMISSION_DENIED => "unable to claim device (permission denied or busy)",
            CONFIG_FAILED => "failed to configure serial port",
            WRITE_TIMEOUT => "usb write timed out",
            DISCONNECTED => "device disconnected",
            _ => return format!("unknown transport error {}", code),
        };
        text.to_string()
    }

    fn max_write_size(&self) -> usize {
        self.config.max_write_size.max(1)
    }
}

/// Picks the port of the lowest-numbered interface among those matching VID:PID.
///
/// Dual-channel bridges expose one port per interface, numbered in interface
/// order, so channel A is the one with the smallest trailing number.
fn select_port(
    ports: Vec<SerialPortInfo>,
    vendor_id: u16,
    product_id: u16,
) -> Option<SerialPortInfo> {
    let mut candidates: Vec<_> = ports
        .into_iter()
        .filter(|p| {
            matches!(&p.port_type, SerialPortType::UsbPort(usb)
                if usb.vid == vendor_id && usb.pid == product_id)
        })
        .collect();

    candidates.sort_by(|a, b| port_order_key(&a.port_name).cmp(&port_order_key(&b.port_name)));
    for port in &candidates {
        debug!("Found serial device: {}", port.port_name);
    }
    candidates.into_iter().next()
}

/// Sort key comparing trailing port numbers numerically (`ttyUSB9` < `ttyUSB10`).
fn port_order_key(name: &str) -> (&str, Option<u64>, &str) {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = name[stem.len()..].parse().ok();
    (stem, number, name)
}

fn open_error_code(kind: &tokio_serial::ErrorKind) -> ErrorCode {
    match kind {
        tokio_serial::ErrorKind::NoDevice => DEVICE_NOT_FOUND,
        tokio_serial::ErrorKind::InvalidInput => CONFIG_FAILED,
        tokio_serial::ErrorKind::Io(std::io::ErrorKind::NotFound) => DEVICE_NOT_FOUND,
        tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
        _ => OPEN_FAILED,
    }
}

fn write_error_code(kind: std::io::ErrorKind) -> ErrorCode {
    match kind {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => WRITE_TIMEOUT,
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::NotConnected
        | std::io::ErrorKind::WriteZero => DISCONNECTED,
        _ => WRITE_FAILED,
    }
}
