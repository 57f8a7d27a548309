//! Segment codec — bit layout and the textual wire format.
//!
//! Pure functions only: nothing here touches the device. [`bit_for`] maps a
//! 1-based segment index to its bit, [`encode`] renders a [`BitMask`] as the
//! 8-character frame the driver expects, and [`decode`] turns whatever the
//! driver handed back into a mask again.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::protocol::*;

// ── Error type ──

/// Codec errors. Same input always yields the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Segment index outside `1..=7`.
    InvalidSegmentIndex(u8),
    /// Text that is neither a segment number nor a segment letter.
    UnknownSegment(String),
    /// Raw device data that is not an 8-bit binary frame, even after repair.
    MalformedFrame(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidSegmentIndex(i) => {
                write!(f, "Invalid segment index {i} (expected 1-{SEGMENT_COUNT})")
            }
            CodecError::UnknownSegment(s) => {
                write!(f, "Unknown segment {s:?} (expected 1-{SEGMENT_COUNT} or A-G)")
            }
            CodecError::MalformedFrame(e) => write!(f, "Malformed frame: {e}"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type Result<T> = std::result::Result<T, CodecError>;

// ── Segment index ──

/// A validated, 1-based segment index (1 = A … 7 = G).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SegmentIndex(u8);

impl SegmentIndex {
    /// All segments, A through G.
    pub const ALL: [SegmentIndex; SEGMENT_COUNT as usize] = [
        SegmentIndex(1),
        SegmentIndex(2),
        SegmentIndex(3),
        SegmentIndex(4),
        SegmentIndex(5),
        SegmentIndex(6),
        SegmentIndex(7),
    ];

    pub fn new(index: u8) -> Result<Self> {
        if (1..=SEGMENT_COUNT).contains(&index) {
            Ok(SegmentIndex(index))
        } else {
            Err(CodecError::InvalidSegmentIndex(index))
        }
    }

    /// Build from a segment letter (`'A'`–`'G'`, case-insensitive).
    pub fn from_label(label: char) -> Option<Self> {
        let upper = label.to_ascii_uppercase();
        SEGMENT_LABELS
            .iter()
            .position(|&l| l == upper)
            .map(|pos| SegmentIndex(pos as u8 + 1))
    }

    pub fn label(self) -> char {
        SEGMENT_LABELS[usize::from(self.0 - 1)]
    }

    /// The single bit this segment occupies.
    pub fn bit(self) -> BitMask {
        BitMask(1 << (FRAME_LEN as u8 - self.0))
    }
}

impl fmt::Display for SegmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// Accepts `1`–`7` or `A`–`G`.
impl FromStr for SegmentIndex {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(idx) = SegmentIndex::from_label(c)
        {
            return Ok(idx);
        }
        match s.parse::<u8>() {
            Ok(n) => SegmentIndex::new(n),
            Err(_) => Err(CodecError::UnknownSegment(s.to_string())),
        }
    }
}

// ── Bit mask ──

/// Segment state, one bit per segment. Bit 7 is segment A, bit 1 is G.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BitMask(u8);

impl BitMask {
    pub const EMPTY: BitMask = BitMask(0);

    pub fn from_bits(bits: u8) -> Self {
        BitMask(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_lit(self, segment: SegmentIndex) -> bool {
        self.0 & segment.bit().0 != 0
    }

    /// Segments whose bit is set, in A..G order.
    pub fn lit_segments(self) -> Vec<SegmentIndex> {
        SegmentIndex::ALL
            .into_iter()
            .filter(|&s| self.is_lit(s))
            .collect()
    }

    /// Mask with the reserved bit cleared.
    pub fn without_reserved(self) -> Self {
        BitMask(self.0 & SEGMENT_BITS)
    }
}

impl std::ops::BitXorAssign for BitMask {
    fn bitxor_assign(&mut self, rhs: BitMask) {
        self.0 ^= rhs.0;
    }
}

impl fmt::Display for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b{:08b}", self.0)
    }
}

// ── Wire frame ──

/// Exactly eight ASCII `'0'`/`'1'` bytes, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFrame([u8; FRAME_LEN]);

impl WireFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only ever built from ASCII digits.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for WireFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Codec operations ──

/// Mask with exactly the bit for `index` set (`1 → 0b1000_0000`, `7 → 0b0000_0010`).
pub fn bit_for(index: u8) -> Result<BitMask> {
    SegmentIndex::new(index).map(SegmentIndex::bit)
}

/// Render a mask as a wire frame. The reserved bit is always written as `'0'`.
pub fn encode(mask: BitMask) -> WireFrame {
    let bits = mask.without_reserved().0;
    let mut frame = [b'0'; FRAME_LEN];
    for (i, byte) in frame.iter_mut().enumerate() {
        if bits & (0x80 >> i) != 0 {
            *byte = b'1';
        }
    }
    WireFrame(frame)
}

/// Decode up to [`FRAME_LEN`] raw bytes read from the device.
///
/// Trailing NULs are stripped. A frame that is still shorter than eight
/// characters gets a single `'0'` appended, which repairs the driver's
/// seven-character-plus-NUL answer. Anything that is not exactly eight
/// binary digits after that is a [`CodecError::MalformedFrame`].
pub fn decode(raw: &[u8]) -> Result<BitMask> {
    if raw.len() > FRAME_LEN {
        return Err(CodecError::MalformedFrame(format!(
            "{} bytes (max {FRAME_LEN})",
            raw.len()
        )));
    }
    let text = std::str::from_utf8(raw)
        .map_err(|e| CodecError::MalformedFrame(format!("not text: {e}")))?;
    let mut text = text.trim_end_matches('\0').to_string();
    if text.len() < FRAME_LEN {
        text.push(SHORT_READ_PAD);
    }
    if text.len() != FRAME_LEN {
        return Err(CodecError::MalformedFrame(format!(
            "{text:?} is {} characters after padding (expected {FRAME_LEN})",
            text.len()
        )));
    }
    if let Some(bad) = text.chars().find(|c| !matches!(c, '0' | '1')) {
        return Err(CodecError::MalformedFrame(format!(
            "unexpected character {bad:?} in {text:?}"
        )));
    }
    u8::from_str_radix(&text, 2)
        .map(BitMask)
        .map_err(|e| CodecError::MalformedFrame(format!("{text:?}: {e}")))
}
