//! Async driver for the Microchip MCP3422/3/4 delta-sigma ADC.
//!
//! This crate provides an Embassy-compatible async I2C driver for the
//! MCP342x family: 12- to 18-bit converters with a programmable gain
//! amplifier and two (MCP3422/3) or four (MCP3424) differential inputs.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private): the configuration write and result read
//!   transactions, each bounded by a transaction timeout.
//! - **[`Mcp342x`]** (public): cached settings, one-shot triggering, and
//!   result polling bounded by the conversion time.
//! - **[`config`]** and **[`sample`]**: register field types and result
//!   decoding, usable without a bus.
//!
//! # Quick start
//!
//! ```ignore
//! use mcp342x_driver::{Channel, Gain, Mcp342x, Resolution, DEFAULT_ADDRESS};
//!
//! // Construct with any `embedded-hal-async` I2C implementation and a
//! // cloneable delay provider such as `embassy_time::Delay`.
//! let mut adc = Mcp342x::new(i2c, embassy_time::Delay, DEFAULT_ADDRESS);
//!
//! adc.set_resolution(Resolution::Bits16);
//! adc.set_gain(Gain::X2);
//!
//! for channel in Channel::ALL {
//!     adc.set_channel(channel);
//!     let volts = adc.read_volts().await?;
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: enable [`defmt::Format`] implementations on public types
//!   and debug logging of bus activity.

#![cfg_attr(not(test), no_std)]

pub use config::{BusConfig, Channel, Configuration, ConversionMode, Gain, Resolution};
pub use converter::Mcp342x;
pub use error::{AdcError, BusFault};
pub use registers::{
    DEFAULT_ADDRESS, DEFAULT_FREQUENCY_HZ, DEFAULT_TRANSACTION_TIMEOUT, ONE_SHOT_STANDBY_MARGIN,
    POWER_ON_CONFIG,
};
pub use sample::ResolutionConstants;

pub mod config;
mod converter;
mod driver;
mod error;
mod registers;
pub mod sample;

#[cfg(test)]
mod test_support;
