//! Display protocol definitions and encoding.
//!
//! Every command is one opcode byte followed by fixed-width operands:
//! - Coordinates: one byte each, column then row
//! - Colors: two bytes each, RGB565 high byte first
//! - Command bytes: 0x21 (line), 0x22 (box), 0x25 (clear), 0x5C/0x5D (pixel transfer)
//!
//! Pixel data between the transfer markers is raw RGB565 and is not framed.

use crate::color::Color565;
use crate::geometry::{Line, Rect};

/// Size of a clear-display packet.
pub const CLEAR_PACKET_SIZE: usize = 1;

/// Size of a draw-line packet.
pub const LINE_PACKET_SIZE: usize = 7;

/// Size of a draw-box packet.
pub const BOX_PACKET_SIZE: usize = 9;

/// Size of a transfer marker packet.
pub const MARKER_PACKET_SIZE: usize = 1;

/// Display command opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Draw a line between two points.
    DrawLine = 0x21,
    /// Draw a filled rectangle with a border.
    DrawBox = 0x22,
    /// Clear the whole display.
    ClearDisplay = 0x25,
    /// Start streaming raw pixel data.
    BeginTransfer = 0x5C,
    /// Stop streaming raw pixel data.
    EndTransfer = 0x5D,
}

/// Builds a clear-display packet.
pub fn build_clear_packet() -> [u8; CLEAR_PACKET_SIZE] {
    [Command::ClearDisplay as u8]
}

/// Builds a draw-line packet.
pub fn build_line_packet(line: &Line, color: Color565) -> [u8; LINE_PACKET_SIZE] {
    let [hi, lo] = color.to_bytes();
    [
        Command::DrawLine as u8,
        line.start.x,
        line.start.y,
        line.end.x,
        line.end.y,
        hi,
        lo,
    ]
}

/// Builds a draw-box packet.
pub fn build_box_packet(rect: &Rect, border: Color565, fill: Color565) -> [u8; BOX_PACKET_SIZE] {
    let mut buffer = [0u8; BOX_PACKET_SIZE];
    buffer[0] = Command::DrawBox as u8;
    buffer[1] = rect.top_left.x;
    buffer[2] = rect.top_left.y;
    buffer[3] = rect.bottom_right.x;
    buffer[4] = rect.bottom_right.y;
    buffer[5..7].copy_from_slice(&border.to_bytes());
    buffer[7..9].copy_from_slice(&fill.to_bytes());
    buffer
}

/// Builds the marker that opens a pixel transfer.
pub fn build_begin_transfer_packet() -> [u8; MARKER_PACKET_SIZE] {
    [Command::BeginTransfer as u8]
}

/// Builds the marker that closes a pixel transfer.
pub fn build_end_transfer_packet() -> [u8; MARKER_PACKET_SIZE] {
    [Command::EndTransfer as u8]
}
