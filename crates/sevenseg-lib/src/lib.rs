//! sevenseg — segment state protocol for a character-device driven 7-segment display.

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod protocol;
pub mod state;

pub use error::SevensegError;
