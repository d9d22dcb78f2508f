//! Display module.
//!
//! Command encoding, caller-side pixel buffers and the stateful session
//! that drives the display over a [`Transport`](crate::Transport).

mod session;

pub mod framebuffer;
pub mod protocol;

pub use framebuffer::PixelBuffer;
pub use protocol::Command;
pub use session::{DisplaySession, SessionState};
