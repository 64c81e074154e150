//! High-level interface for the MCP342x.
//!
//! [`Mcp342x`] keeps a cached copy of the configuration register and only
//! writes it when a setting has changed, triggers one-shot conversions, and
//! polls for the result until the expected conversion time has passed.

use core::future::ready;
use core::pin::pin;

use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::{BusConfig, Channel, Configuration, ConversionMode, Gain, Resolution};
use crate::driver::{micros, BusDriver};
use crate::error::AdcError;
use crate::registers::{MAX_FRAME_LEN, ONE_SHOT_STANDBY_MARGIN, READY_MASK};
use crate::sample::{conversion_complete, ResolutionConstants};

/// Driver for one MCP3422/3/4 converter.
///
/// Settings are changed locally with the `set_*` methods and sent to the
/// device on the next measurement. The driver assumes the device is in its
/// power-on state when constructed (channel 1, continuous, 12-bit, x1).
///
/// # Example
///
/// ```ignore
/// use mcp342x_driver::{Channel, ConversionMode, Mcp342x, Resolution, DEFAULT_ADDRESS};
///
/// // `i2c` is any `embedded-hal-async` I2C implementation
/// let mut adc = Mcp342x::new(i2c, embassy_time::Delay, DEFAULT_ADDRESS);
///
/// adc.set_mode(ConversionMode::OneShot);
/// adc.set_resolution(Resolution::Bits16);
/// adc.set_channel(Channel::Ch2);
///
/// let volts = adc.read_volts().await?;
/// ```
pub struct Mcp342x<I2C, D> {
    bus: BusDriver<I2C, D>,
    config: Configuration,
    constants: ResolutionConstants,
    dirty: bool,
}

impl<I2C, D> Mcp342x<I2C, D>
where
    I2C: I2c,
    D: DelayNs + Clone,
{
    /// Create a driver with the default bus settings and the given address.
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (takes ownership for exclusive access)
    /// * `delay`: delay provider used for the conversion and transaction
    ///   timeouts; cloned for every timer armed
    /// * `address`: 7-bit I2C device address (0x68-0x6F)
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self::with_config(
            i2c,
            delay,
            BusConfig {
                address,
                ..BusConfig::default()
            },
        )
    }

    /// Create a driver with explicit bus settings. No bus traffic is
    /// generated.
    pub fn with_config(i2c: I2C, delay: D, bus: BusConfig) -> Self {
        let config = Configuration::default();

        Self {
            bus: BusDriver::new(i2c, delay, bus),
            config,
            constants: ResolutionConstants::new(config.resolution),
            dirty: false,
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Select the conversion resolution. Takes effect on the next read.
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.config.resolution = resolution;
        self.constants = ResolutionConstants::new(resolution);
        self.dirty = true;
    }

    /// Select the PGA gain. Takes effect on the next read.
    pub fn set_gain(&mut self, gain: Gain) {
        self.config.gain = gain;
        self.dirty = true;
    }

    /// Select the input channel. Takes effect on the next read.
    pub fn set_channel(&mut self, channel: Channel) {
        self.config.channel = channel;
        self.dirty = true;
    }

    /// Select one-shot or continuous conversion. Takes effect on the next
    /// read.
    pub fn set_mode(&mut self, mode: ConversionMode) {
        self.config.mode = mode;
        self.dirty = true;
    }

    /// Replace all four settings at once. Takes effect on the next read.
    pub fn set_configuration(&mut self, config: Configuration) {
        self.config = config;
        self.constants = ResolutionConstants::new(config.resolution);
        self.dirty = true;
    }

    /// Change the bound on a single bus transaction.
    pub fn set_transaction_timeout(&mut self, timeout: Duration) {
        self.bus.set_transaction_timeout(timeout);
    }

    pub fn resolution(&self) -> Resolution {
        self.config.resolution
    }

    pub fn gain(&self) -> Gain {
        self.config.gain
    }

    pub fn channel(&self) -> Channel {
        self.config.channel
    }

    pub fn mode(&self) -> ConversionMode {
        self.config.mode
    }

    pub fn configuration(&self) -> Configuration {
        self.config
    }

    /// Constants of the active resolution.
    pub fn constants(&self) -> ResolutionConstants {
        self.constants
    }

    /// Whether a setting changed since the configuration register was last
    /// written.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn address(&self) -> u8 {
        self.bus.address()
    }

    /// Bus clock rate the device was declared with.
    pub fn frequency_hz(&self) -> u32 {
        self.bus.frequency_hz()
    }

    pub fn transaction_timeout(&self) -> Duration {
        self.bus.transaction_timeout()
    }

    /// Time allowed for a conversion to complete with the current settings.
    ///
    /// One-shot conversions get [`ONE_SHOT_STANDBY_MARGIN`] on top of the
    /// nominal conversion time.
    pub fn conversion_window(&self) -> Duration {
        match self.config.mode {
            ConversionMode::OneShot => self.constants.conversion_time + ONE_SHOT_STANDBY_MARGIN,
            ConversionMode::Continuous => self.constants.conversion_time,
        }
    }

    // -----------------------------------------------------------------------
    // Measurement
    // -----------------------------------------------------------------------

    /// Measure the selected channel and return the input voltage.
    ///
    /// Writes the configuration register if a setting changed, starts a
    /// conversion in one-shot mode, then polls the device until a new
    /// result is ready or [`conversion_window`](Self::conversion_window)
    /// elapses.
    ///
    /// # Errors
    /// * [`AdcError::Bus`] if any transaction fails or exceeds the
    ///   transaction timeout. Returned immediately.
    /// * [`AdcError::ConversionTimeout`] if no new result arrived in time.
    ///
    /// No retry is attempted either way.
    pub async fn read_volts(&mut self) -> Result<f32, AdcError<I2C::Error>> {
        let counts = self.read_counts().await?;
        Ok(self.constants.counts_to_volts(counts, self.config.gain))
    }

    /// Measure the selected channel and return the signed result in counts.
    ///
    /// Same protocol and errors as [`read_volts`](Self::read_volts).
    pub async fn read_counts(&mut self) -> Result<i32, AdcError<I2C::Error>> {
        self.configure().await?;

        let address = self.bus.address();
        let window = self.conversion_window();
        let constants = self.constants;
        let mut buf = [0u8; MAX_FRAME_LEN];
        let frame = &mut buf[..constants.frame_len];

        let mut timer = self.bus.timer();
        let mut alarm = pin!(timer.delay_us(micros(window)));

        // Start the clock before the first transfer.
        let mut expired = matches!(select(alarm.as_mut(), ready(())).await, Either::First(()));

        loop {
            // Never cancelled mid-transfer; only the transaction timeout
            // bounds it.
            self.bus.read_frame(frame).await?;

            if conversion_complete(frame) {
                return Ok(constants.decode_counts(frame));
            }

            // Stale result. Ask again unless the window has closed.
            if !expired {
                expired = matches!(
                    select(alarm.as_mut(), yield_now()).await,
                    Either::First(())
                );
            }

            if expired {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "mcp342x {=u8:#x}: no sample within {=u64} ms",
                    address,
                    window.as_millis()
                );
                return Err(AdcError::ConversionTimeout { address });
            }
        }
    }

    /// Write a raw configuration byte immediately.
    ///
    /// The decoded fields become the cached settings. Bit 7 is sent as
    /// given, so a one-shot word with bit 7 set also starts a conversion.
    ///
    /// # Errors
    /// * [`AdcError::Bus`] on communication failure; the cached settings are
    ///   left unchanged.
    pub async fn configure_device(&mut self, word: u8) -> Result<(), AdcError<I2C::Error>> {
        self.bus.write_config(word).await?;

        let config = Configuration::decode(word);
        self.config = config;
        self.constants = ResolutionConstants::new(config.resolution);
        self.dirty = false;

        Ok(())
    }

    /// Give back the I2C bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        self.bus.release()
    }

    // -----------------------------------------------------------------------
    // Protocol steps
    // -----------------------------------------------------------------------

    /// Sync the configuration register if needed and trigger a one-shot
    /// conversion.
    async fn configure(&mut self) -> Result<(), AdcError<I2C::Error>> {
        let word = self.config.encode();

        if self.dirty {
            self.bus.write_config(word).await?;
            self.dirty = false;

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "mcp342x {=u8:#x}: configured {}",
                self.bus.address(),
                self.config
            );
        }

        if self.config.mode == ConversionMode::OneShot {
            self.bus.write_config(word | READY_MASK).await?;
        }

        Ok(())
    }
}
