//! Conversion result decoding.
//!
//! A read frame holds the conversion result (two bytes, or three at 18-bit
//! resolution, most significant byte first) followed by the configuration
//! byte, whose ready bit tells whether the result is new.

use embassy_time::Duration;

use crate::config::{Gain, Resolution};
use crate::registers::READY_MASK;

/// Constants derived from the active resolution.
///
/// Held as one value by the driver so that a resolution change replaces all
/// of them at once.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolutionConstants {
    pub data_mask: u32,
    pub half_scale: u32,
    pub lsb_volts: f32,
    pub conversion_time: Duration,
    pub frame_len: usize,
}

impl ResolutionConstants {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            data_mask: resolution.data_mask(),
            half_scale: resolution.half_scale(),
            lsb_volts: resolution.lsb_volts(),
            conversion_time: resolution.conversion_time(),
            frame_len: resolution.frame_len(),
        }
    }

    /// Decode the signed count from a completed frame.
    ///
    /// The result bytes are the first `frame_len - 1` bytes. Counts at or
    /// above half scale wrap to negative values.
    ///
    /// # Panics
    /// If `frame_len` is zero or `frame` holds fewer than `frame_len - 1`
    /// bytes. Constants built with [`new`](Self::new) never have a zero
    /// `frame_len`.
    pub fn decode_counts(&self, frame: &[u8]) -> i32 {
        let data_len = self
            .frame_len
            .checked_sub(1)
            .unwrap_or_else(|| panic!("frame_len must be at least 1"));
        let data = &frame[..data_len];
        let raw = data
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte))
            & self.data_mask;

        if raw >= self.half_scale {
            raw as i32 - (self.half_scale << 1) as i32
        } else {
            raw as i32
        }
    }

    /// Convert a signed count to volts at the input pins.
    pub fn counts_to_volts(&self, counts: i32, gain: Gain) -> f32 {
        (counts as f32 * self.lsb_volts) / gain.divisor()
    }
}

/// Whether the trailing configuration byte of a frame reports a new result.
pub fn conversion_complete(frame: &[u8]) -> bool {
    frame
        .last()
        .is_some_and(|config| config & READY_MASK == 0)
}
