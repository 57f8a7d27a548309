//! Protocol constants for the `sevenseg` character device.
//!
//! The driver exposes seven GPIO-backed segments through a single device
//! file. State crosses the file boundary as ASCII binary text, most
//! significant bit first:
//!
//! ```text
//! bit:      7 6 5 4 3 2 1 0
//! segment:  A B C D E F G -
//! ```
//!
//! Bit 0 has no segment behind it. The driver only looks at the first seven
//! characters of a write, and answers a read with seven characters followed
//! by a NUL terminator.

// ── Device file ──

/// Device node created by the driver.
pub const DEFAULT_DEVICE_PATH: &str = "/dev/sevenseg";

/// Environment variable that overrides the configured device path.
pub const DEVICE_PATH_ENV: &str = "SEVENSEG_DEVICE";

// ── Frame layout ──

/// Length of one wire frame in bytes (and maximum bytes taken from a read).
pub const FRAME_LEN: usize = 8;

/// Number of physical segments (A–G).
pub const SEGMENT_COUNT: u8 = 7;

/// Segment labels in index order (index 1 = `'A'`).
pub const SEGMENT_LABELS: [char; SEGMENT_COUNT as usize] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

/// Reserved least significant bit; never set on the wire.
pub const RESERVED_BIT: u8 = 0b0000_0001;

/// All bits that map to a segment.
pub const SEGMENT_BITS: u8 = !RESERVED_BIT;

/// Character appended to a NUL-trimmed read that came back short.
pub const SHORT_READ_PAD: char = '0';

// ── Timing ──

/// Default upper bound for one device transaction, in milliseconds.
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 2000;
