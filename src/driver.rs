//! Low-level MCP342x bus driver.
//!
//! Implements the two transactions the device understands (a one-byte
//! configuration write and a 3- or 4-byte result read), each bounded by the
//! transaction timeout.
//!
//! This module is crate-private. Consumers interact with [`Mcp342x`] in
//! `converter.rs` instead.
//!
//! [`Mcp342x`]: crate::Mcp342x

use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use crate::config::BusConfig;
use crate::error::{AdcError, BusFault};

/// Low-level bus driver.
///
/// Owns the I2C peripheral and the delay provider. The delay provider is
/// cloned for every timer the driver arms, so each transaction and each
/// conversion gets an independent timeout.
pub(crate) struct BusDriver<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    frequency_hz: u32,
    transaction_timeout: Duration,
}

impl<I2C, D> BusDriver<I2C, D>
where
    I2C: I2c,
    D: DelayNs + Clone,
{
    /// Create a new bus driver. No bus traffic is generated.
    pub fn new(i2c: I2C, delay: D, config: BusConfig) -> Self {
        Self {
            i2c,
            delay,
            address: config.address,
            frequency_hz: config.frequency_hz,
            transaction_timeout: config.transaction_timeout,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn transaction_timeout(&self) -> Duration {
        self.transaction_timeout
    }

    pub fn set_transaction_timeout(&mut self, timeout: Duration) {
        self.transaction_timeout = timeout;
    }

    /// A fresh timer for racing against a bus operation.
    pub fn timer(&self) -> D {
        self.delay.clone()
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Write one byte to the configuration register.
    pub async fn write_config(&mut self, word: u8) -> Result<(), AdcError<I2C::Error>> {
        let address = self.address;
        let limit = self.transaction_timeout;
        let mut timer = self.delay.clone();
        let buf = [word];

        #[cfg(feature = "defmt")]
        defmt::trace!("mcp342x {=u8:#x}: write config {=u8:#x}", address, word);

        bounded(self.i2c.write(address, &buf), &mut timer, limit, address).await
    }

    /// Read a result frame. `frame.len()` selects the transfer length.
    pub async fn read_frame(&mut self, frame: &mut [u8]) -> Result<(), AdcError<I2C::Error>> {
        let address = self.address;
        let limit = self.transaction_timeout;
        let mut timer = self.delay.clone();

        bounded(self.i2c.read(address, frame), &mut timer, limit, address).await
    }

    /// Give back the I2C bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

/// Race a bus operation against `limit`. A failed or overdue transfer is a
/// bus error.
async fn bounded<F, E, D>(
    operation: F,
    timer: &mut D,
    limit: Duration,
    address: u8,
) -> Result<(), AdcError<E>>
where
    F: Future<Output = Result<(), E>>,
    D: DelayNs,
{
    match select(operation, timer.delay_us(micros(limit))).await {
        Either::First(Ok(())) => Ok(()),
        Either::First(Err(e)) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("mcp342x {=u8:#x}: bus error", address);
            Err(AdcError::i2c(address, e))
        }
        Either::Second(()) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("mcp342x {=u8:#x}: transaction timed out", address);
            Err(AdcError::Bus {
                address,
                fault: BusFault::TransactionTimeout,
            })
        }
    }
}

/// Whole microseconds in `duration`, saturating at `u32::MAX`.
pub(crate) fn micros(duration: Duration) -> u32 {
    u32::try_from(duration.as_micros()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{NeverDelay, ReadyDelay, StallingI2c};
    use embassy_futures::block_on;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDRESS: u8 = 0x6A;

    fn config() -> BusConfig {
        BusConfig {
            address: ADDRESS,
            ..BusConfig::default()
        }
    }

    #[test]
    fn micros_saturates() {
        assert_eq!(micros(Duration::from_millis(1000)), 1_000_000);
        assert_eq!(micros(Duration::from_secs(10_000)), u32::MAX);
    }

    #[test]
    fn write_config_sends_single_byte() {
        let expectations = [Transaction::write(ADDRESS, vec![0x9C])];
        let mut driver = BusDriver::new(I2cMock::new(&expectations), NeverDelay, config());

        assert_eq!(block_on(driver.write_config(0x9C)), Ok(()));

        let (mut i2c, _) = driver.release();
        i2c.done();
    }

    #[test]
    fn read_frame_fills_buffer() {
        let expectations = [Transaction::read(ADDRESS, vec![0x01, 0x02, 0x10])];
        let mut driver = BusDriver::new(I2cMock::new(&expectations), NeverDelay, config());

        let mut frame = [0u8; 3];
        assert_eq!(block_on(driver.read_frame(&mut frame)), Ok(()));
        assert_eq!(frame, [0x01, 0x02, 0x10]);

        let (mut i2c, _) = driver.release();
        i2c.done();
    }

    #[test]
    fn short_transfer_is_bus_error() {
        let expectations =
            [Transaction::read(ADDRESS, vec![0x00, 0x00, 0x00]).with_error(ErrorKind::Other)];
        let mut driver = BusDriver::new(I2cMock::new(&expectations), NeverDelay, config());

        let mut frame = [0u8; 3];
        assert_eq!(
            block_on(driver.read_frame(&mut frame)),
            Err(AdcError::Bus {
                address: ADDRESS,
                fault: BusFault::I2c(ErrorKind::Other),
            })
        );

        let (mut i2c, _) = driver.release();
        i2c.done();
    }

    #[test]
    fn stalled_transaction_times_out() {
        let mut driver = BusDriver::new(StallingI2c, ReadyDelay, config());

        assert_eq!(
            block_on(driver.write_config(0x10)),
            Err(AdcError::Bus {
                address: ADDRESS,
                fault: BusFault::TransactionTimeout,
            })
        );
    }

    #[test]
    fn transaction_timeout_is_adjustable() {
        let mut driver = BusDriver::new(StallingI2c, ReadyDelay, config());
        assert_eq!(driver.transaction_timeout(), Duration::from_millis(1000));

        driver.set_transaction_timeout(Duration::from_millis(25));
        assert_eq!(driver.transaction_timeout(), Duration::from_millis(25));
    }
}
