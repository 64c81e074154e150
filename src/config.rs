//! Configuration types written to and read back from the MCP342x.

use bit_field::BitField;
use embassy_time::Duration;

use crate::registers::{
    CHANNEL_BITS, DEFAULT_ADDRESS, DEFAULT_FREQUENCY_HZ, DEFAULT_TRANSACTION_TIMEOUT, GAIN_BITS,
    MODE_BIT, RESOLUTION_BITS,
};

// ---------------------------------------------------------------------------
// Register fields
// ---------------------------------------------------------------------------

/// Conversion resolution. More bits means a slower conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// 12 bits, 240 samples/s (power-on default).
    #[default]
    Bits12 = 0b00,
    /// 14 bits, 60 samples/s.
    Bits14 = 0b01,
    /// 16 bits, 15 samples/s.
    Bits16 = 0b10,
    /// 18 bits, 3.75 samples/s.
    Bits18 = 0b11,
}

impl Resolution {
    /// All resolutions, lowest first.
    pub const ALL: [Resolution; 4] = [
        Resolution::Bits12,
        Resolution::Bits14,
        Resolution::Bits16,
        Resolution::Bits18,
    ];

    /// Decode the two-bit S1:S0 field. Upper bits are ignored.
    pub fn from_field(field: u8) -> Self {
        match field & 0b11 {
            0b00 => Resolution::Bits12,
            0b01 => Resolution::Bits14,
            0b10 => Resolution::Bits16,
            _ => Resolution::Bits18,
        }
    }

    /// Number of significant bits in a conversion result.
    pub fn bits(self) -> u8 {
        12 + 2 * self as u8
    }

    /// Nominal sample rate in samples per second.
    pub fn samples_per_second(self) -> f32 {
        match self {
            Resolution::Bits12 => 240.0,
            Resolution::Bits14 => 60.0,
            Resolution::Bits16 => 15.0,
            Resolution::Bits18 => 3.75,
        }
    }

    /// Nominal time for one conversion, rounded up to whole milliseconds.
    pub fn conversion_time(self) -> Duration {
        match self {
            Resolution::Bits12 => Duration::from_millis(5),
            Resolution::Bits14 => Duration::from_millis(20),
            Resolution::Bits16 => Duration::from_millis(70),
            Resolution::Bits18 => Duration::from_millis(270),
        }
    }

    /// Number of bytes in a read frame: the result bytes plus the trailing
    /// configuration byte.
    pub fn frame_len(self) -> usize {
        match self {
            Resolution::Bits18 => 4,
            _ => 3,
        }
    }

    /// Mask selecting the result bits of the raw count.
    pub fn data_mask(self) -> u32 {
        (1 << self.bits()) - 1
    }

    /// Half the full-scale count. Masked counts at or above this value are
    /// negative.
    pub fn half_scale(self) -> u32 {
        1 << (self.bits() - 1)
    }

    /// Voltage represented by one count at gain x1.
    pub fn lsb_volts(self) -> f32 {
        match self {
            Resolution::Bits12 => 0.001,
            Resolution::Bits14 => 0.000_25,
            Resolution::Bits16 => 0.000_062_5,
            Resolution::Bits18 => 0.000_015_625,
        }
    }
}

/// Programmable gain amplifier setting, stored as a power-of-two exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// x1 (power-on default).
    #[default]
    X1 = 0b00,
    X2 = 0b01,
    X4 = 0b10,
    X8 = 0b11,
}

impl Gain {
    pub const ALL: [Gain; 4] = [Gain::X1, Gain::X2, Gain::X4, Gain::X8];

    /// Decode the two-bit G1:G0 field. Upper bits are ignored.
    pub fn from_field(field: u8) -> Self {
        match field & 0b11 {
            0b00 => Gain::X1,
            0b01 => Gain::X2,
            0b10 => Gain::X4,
            _ => Gain::X8,
        }
    }

    /// Gain exponent (0-3).
    pub fn exponent(self) -> u8 {
        self as u8
    }

    /// Amplification factor, `2^exponent`.
    pub fn factor(self) -> u8 {
        1 << self.exponent()
    }

    /// Divisor applied to a converted voltage to undo the amplification.
    pub fn divisor(self) -> f32 {
        f32::from(self.factor())
    }
}

/// Input channel.
///
/// The MCP3422 and MCP3423 only have channels 1 and 2. The driver does not
/// check which variant is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Power-on default.
    #[default]
    Ch1 = 0b00,
    Ch2 = 0b01,
    Ch3 = 0b10,
    Ch4 = 0b11,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Ch1, Channel::Ch2, Channel::Ch3, Channel::Ch4];

    /// Decode the two-bit C1:C0 field. Upper bits are ignored.
    pub fn from_field(field: u8) -> Self {
        match field & 0b11 {
            0b00 => Channel::Ch1,
            0b01 => Channel::Ch2,
            0b10 => Channel::Ch3,
            _ => Channel::Ch4,
        }
    }

    /// Channel number as printed in the datasheet (1-4).
    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Conversion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionMode {
    /// One conversion per trigger, then low-current standby.
    OneShot = 0,
    /// Free-running conversions at the configured rate (power-on default).
    #[default]
    Continuous = 1,
}

impl ConversionMode {
    pub const ALL: [ConversionMode; 2] = [ConversionMode::OneShot, ConversionMode::Continuous];
}

// ---------------------------------------------------------------------------
// Configuration byte
// ---------------------------------------------------------------------------

/// The four fields of the configuration register.
///
/// The default value matches the device's power-on state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub channel: Channel,
    pub mode: ConversionMode,
    pub resolution: Resolution,
    pub gain: Gain,
}

impl Configuration {
    /// Pack into a configuration byte with the ready bit clear.
    pub fn encode(&self) -> u8 {
        let mut word = 0u8;
        word.set_bits(CHANNEL_BITS, self.channel as u8)
            .set_bit(MODE_BIT, self.mode == ConversionMode::Continuous)
            .set_bits(RESOLUTION_BITS, self.resolution as u8)
            .set_bits(GAIN_BITS, self.gain as u8);
        word
    }

    /// Unpack a configuration byte. The ready bit is ignored.
    pub fn decode(word: u8) -> Self {
        let mode = if word.get_bit(MODE_BIT) {
            ConversionMode::Continuous
        } else {
            ConversionMode::OneShot
        };

        Self {
            channel: Channel::from_field(word.get_bits(CHANNEL_BITS)),
            mode,
            resolution: Resolution::from_field(word.get_bits(RESOLUTION_BITS)),
            gain: Gain::from_field(word.get_bits(GAIN_BITS)),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus settings
// ---------------------------------------------------------------------------

/// Bus parameters fixed for the lifetime of a driver instance (except the
/// transaction timeout, which can be changed later).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// 7-bit I2C address, 0x68-0x6F depending on the address pins.
    pub address: u8,
    /// I2C clock rate in Hz. The driver does not program the bus itself;
    /// this is the rate the caller should configure the peripheral with.
    pub frequency_hz: u32,
    /// Upper bound on any single bus transaction.
    pub transaction_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{POWER_ON_CONFIG, READY_MASK};

    // ── Field helpers ────────────────────────────────────────────────

    #[test]
    fn resolution_bits_and_frame_lengths() {
        let bits: [u8; 4] = Resolution::ALL.map(Resolution::bits);
        assert_eq!(bits, [12, 14, 16, 18]);

        let frames: [usize; 4] = Resolution::ALL.map(Resolution::frame_len);
        assert_eq!(frames, [3, 3, 3, 4]);
    }

    #[test]
    fn resolution_masks_and_half_scale_follow_bit_width() {
        for resolution in Resolution::ALL {
            let bits = u32::from(resolution.bits());
            assert_eq!(resolution.data_mask(), (1 << bits) - 1, "{:?}", resolution);
            assert_eq!(resolution.half_scale(), 1 << (bits - 1), "{:?}", resolution);
        }
    }

    #[test]
    fn higher_resolution_converts_slower() {
        let times = Resolution::ALL.map(Resolution::conversion_time);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(times[0], Duration::from_millis(5));
        assert_eq!(times[3], Duration::from_millis(270));
    }

    #[test]
    fn gain_divisor_is_power_of_two() {
        let divisors = Gain::ALL.map(Gain::divisor);
        assert_eq!(divisors, [1.0, 2.0, 4.0, 8.0]);
    }

    #[test]
    fn channel_numbers_are_one_based() {
        assert_eq!(Channel::ALL.map(Channel::number), [1, 2, 3, 4]);
    }

    // ── Encoding ─────────────────────────────────────────────────────

    #[test]
    fn default_matches_power_on_register() {
        assert_eq!(Configuration::default().encode(), POWER_ON_CONFIG);
        assert_eq!(Configuration::decode(POWER_ON_CONFIG), Configuration::default());
    }

    #[test]
    fn fields_land_on_documented_bits() {
        let config = Configuration {
            channel: Channel::Ch4,
            mode: ConversionMode::OneShot,
            resolution: Resolution::Bits16,
            gain: Gain::X2,
        };
        // C1:C0 = 11, O/C = 0, S1:S0 = 10, G1:G0 = 01
        assert_eq!(config.encode(), 0b0110_1001);
    }

    #[test]
    fn encode_never_sets_ready_bit() {
        for channel in Channel::ALL {
            let config = Configuration { channel, ..Default::default() };
            assert_eq!(config.encode() & READY_MASK, 0);
        }
    }

    #[test]
    fn decode_ignores_ready_bit() {
        let word = 0b0011_1011;
        assert_eq!(
            Configuration::decode(word | READY_MASK),
            Configuration::decode(word)
        );
    }

    #[test]
    fn every_configuration_round_trips() {
        let mut count = 0;
        for channel in Channel::ALL {
            for mode in ConversionMode::ALL {
                for resolution in Resolution::ALL {
                    for gain in Gain::ALL {
                        let config = Configuration { channel, mode, resolution, gain };
                        assert_eq!(Configuration::decode(config.encode()), config);
                        count += 1;
                    }
                }
            }
        }
        assert_eq!(count, 128);
    }

    // ── Bus settings ─────────────────────────────────────────────────

    #[test]
    fn bus_config_defaults() {
        let config = BusConfig::default();
        assert_eq!(config.address, 0x68);
        assert_eq!(config.frequency_hz, 100_000);
        assert_eq!(config.transaction_timeout, Duration::from_millis(1000));
    }
}
