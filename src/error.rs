//! Error types for the ADC driver.

use core::fmt;

/// Why a bus transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault<E> {
    /// The I2C implementation reported an error, e.g. a NACK that left the
    /// transfer short.
    I2c(E),

    /// The transaction did not finish within the configured transaction
    /// timeout.
    TransactionTimeout,
}

/// Errors that can occur while measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError<E> {
    /// A bus transaction with the device failed.
    Bus { address: u8, fault: BusFault<E> },

    /// No completed conversion arrived within the expected conversion time.
    ConversionTimeout { address: u8 },
}

impl<E> AdcError<E> {
    /// I2C address of the device that failed.
    pub fn address(&self) -> u8 {
        match self {
            AdcError::Bus { address, .. } | AdcError::ConversionTimeout { address } => *address,
        }
    }

    pub(crate) fn i2c(address: u8, error: E) -> Self {
        AdcError::Bus {
            address,
            fault: BusFault::I2c(error),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for AdcError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AdcError::Bus {
                address,
                fault: BusFault::I2c(e),
            } => write!(f, "I2C error at 0x{:02x}: {:?}", address, e),
            AdcError::Bus {
                address,
                fault: BusFault::TransactionTimeout,
            } => write!(f, "I2C transaction timed out at 0x{:02x}", address),
            AdcError::ConversionTimeout { address } => {
                write!(f, "No sample from 0x{:02x}", address)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for AdcError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            AdcError::Bus {
                address,
                fault: BusFault::I2c(e),
            } => defmt::write!(f, "I2C error at {=u8:#x}: {}", *address, e),
            AdcError::Bus {
                address,
                fault: BusFault::TransactionTimeout,
            } => defmt::write!(f, "I2C transaction timed out at {=u8:#x}", *address),
            AdcError::ConversionTimeout { address } => {
                defmt::write!(f, "No sample from {=u8:#x}", *address)
            }
        }
    }
}
