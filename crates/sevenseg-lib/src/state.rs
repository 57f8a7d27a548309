//! Display state — the in-memory mirror of the device's segment mask.
//!
//! [`DisplayState`] is seeded by one device read and afterwards changes only
//! through [`DisplayState::toggle`]. Front ends hold the state and call
//! `current()` to render and `toggle()` on user input; they never talk to
//! the device directly.

use std::sync::{Mutex, MutexGuard};

use crate::codec::{self, BitMask, SegmentIndex};
use crate::device::{DeviceChannel, DeviceError, Result};

/// Outcome of a toggle request.
///
/// `mask` always reflects the requested flip. `write_error` is set when the
/// frame didn't reach the device; memory and device are then out of sync
/// until the next successful write.
#[derive(Debug)]
pub struct Toggled {
    pub mask: BitMask,
    pub write_error: Option<DeviceError>,
}

impl Toggled {
    pub fn persisted(&self) -> bool {
        self.write_error.is_none()
    }
}

/// Mirror of the display, bound to the channel that persists it.
///
/// Toggles are serialized: the flip and the device write happen under one
/// lock, so concurrent callers can't lose updates and frames reach the
/// device in the same order as the in-memory transitions.
pub struct DisplayState<C: DeviceChannel> {
    channel: C,
    mask: Mutex<BitMask>,
}

impl<C: DeviceChannel> DisplayState<C> {
    /// Seed the mirror from one device read.
    ///
    /// A failure here leaves no sane state to show; callers are expected to
    /// give up.
    pub fn initialize(channel: C) -> Result<Self> {
        let mask = channel.read()?;
        log::info!("initial state from {}: {mask}", channel.describe());
        Ok(Self {
            channel,
            mask: Mutex::new(mask),
        })
    }

    /// Current mask, without touching the device.
    pub fn current(&self) -> BitMask {
        *self.lock()
    }

    /// Flip one segment and persist the new mask.
    ///
    /// The in-memory flip is never undone; a failed write is logged and
    /// handed back in [`Toggled::write_error`].
    pub fn toggle(&self, index: SegmentIndex) -> Toggled {
        let mut mask = self.lock();
        *mask ^= index.bit();
        let new_mask = *mask;
        let write_error = self.channel.write(&codec::encode(new_mask)).err();
        drop(mask);

        match &write_error {
            None => log::debug!("segment {index} toggled, state {new_mask}"),
            Some(e) => log::warn!("segment {index} toggled to {new_mask} but not persisted: {e}"),
        }
        Toggled {
            mask: new_mask,
            write_error,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn lock(&self) -> MutexGuard<'_, BitMask> {
        // A u8 can't be left half-written; recover from poisoning.
        self.mask.lock().unwrap_or_else(|e| e.into_inner())
    }
}
