//! Configuration register layout and protocol constants for the MCP342x.
//!
//! The device has a single 8-bit configuration register and no register
//! pointer. A one-byte write replaces the register; a read returns the
//! conversion result followed by the current configuration byte:
//!
//! ```text
//! bit:   7      6   5     4      3   2     1   0
//!      [RDY] [  C1:C0 ] [O/C] [  S1:S0 ] [  G1:G0 ]
//! ```

use core::ops::Range;

use embassy_time::Duration;

// ---------------------------------------------------------------------------
// Configuration register fields
// ---------------------------------------------------------------------------

/// Ready bit. Writing 1 in one-shot mode starts a conversion; reading 0
/// means the returned result is a new, unread conversion.
pub const READY_BIT: usize = 7;

/// Channel selection bits (C1:C0).
pub const CHANNEL_BITS: Range<usize> = 5..7;

/// Conversion mode bit (O/C). 1 = continuous, 0 = one-shot.
pub const MODE_BIT: usize = 4;

/// Sample rate / resolution selection bits (S1:S0).
pub const RESOLUTION_BITS: Range<usize> = 2..4;

/// PGA gain selection bits (G1:G0).
pub const GAIN_BITS: Range<usize> = 0..2;

/// Mask of the ready bit within the configuration byte.
pub const READY_MASK: u8 = 1 << READY_BIT;

/// Configuration register contents after power-on reset: channel 1,
/// continuous, 12-bit, gain x1.
pub const POWER_ON_CONFIG: u8 = 0x10;

// ---------------------------------------------------------------------------
// Bus parameters
// ---------------------------------------------------------------------------

/// Default 7-bit I2C address (both address pins low or floating).
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Default I2C clock rate in Hz (standard mode).
pub const DEFAULT_FREQUENCY_HZ: u32 = 100_000;

/// Default bound on a single bus transaction.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Extra time allowed in one-shot mode for the device to leave standby.
///
/// Hardware characterisation value, not derived from the datasheet timing.
pub const ONE_SHOT_STANDBY_MARGIN: Duration = Duration::from_millis(200);

/// Length of the longest read frame (18-bit result plus configuration byte).
pub const MAX_FRAME_LEN: usize = 4;
