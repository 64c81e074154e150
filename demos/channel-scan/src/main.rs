//! Channel scan example
//!
//! Demonstrates basic usage of the mcp342x-driver crate on the Raspberry Pi
//! Pico 2. Measures each input once in one-shot mode, then alternates
//! between channels 1 and 2 in continuous mode, logging every reading via
//! defmt. Failed readings are logged and the loop carries on after the
//! usual pause.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                          |
//! |-----------|------------|--------------------------------|
//! | I2C0 SDA  | GP20       |                                |
//! | I2C0 SCL  | GP21       |                                |
//! | Adr0/Adr1 | GND        | Device answers at 0x68         |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use mcp342x_driver::{BusConfig, Channel, ConversionMode, Gain, Mcp342x, Resolution};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

// Wire the I2C0 interrupt to Embassy's handler.
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Pause between one-shot readings.
const ONE_SHOT_PAUSE: Duration = Duration::from_millis(500);

/// Pause between continuous readings.
const CONTINUOUS_PAUSE: Duration = Duration::from_millis(1000);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // --- I2C bus at the clock rate the ADC is declared with ---
    let bus = BusConfig::default();
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = bus.frequency_hz;

    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c_config,
    );

    // --- ADC ---
    let mut adc = Mcp342x::with_config(i2c, Delay, bus);

    info!("MCP342x at {=u8:#x}: one-shot scan", adc.address());

    adc.set_mode(ConversionMode::OneShot);
    adc.set_resolution(Resolution::Bits16);
    adc.set_gain(Gain::X1);

    for channel in Channel::ALL {
        adc.set_channel(channel);

        match adc.read_volts().await {
            Ok(volts) => info!(
                "Single on channel {} => {} V  (resolution {}-bit, gain x{})",
                channel.number(),
                volts,
                adc.resolution().bits(),
                adc.gain().factor(),
            ),
            Err(e) => error!("Channel {}: {}", channel.number(), e),
        }

        Timer::after(ONE_SHOT_PAUSE).await;
    }

    info!("Continuous conversion on channels 1 and 2");

    adc.set_mode(ConversionMode::Continuous);
    let mut channel = Channel::Ch1;

    // Main loop: switch channel, read, log, repeat.
    loop {
        adc.set_channel(channel);

        match adc.read_volts().await {
            Ok(volts) => info!(
                "Continuous on channel {} => {} V  (resolution {}-bit, gain x{})",
                channel.number(),
                volts,
                adc.resolution().bits(),
                adc.gain().factor(),
            ),
            Err(e) => error!("Channel {}: {}", channel.number(), e),
        }

        channel = match channel {
            Channel::Ch1 => Channel::Ch2,
            _ => Channel::Ch1,
        };

        Timer::after(CONTINUOUS_PAUSE).await;
    }
}
