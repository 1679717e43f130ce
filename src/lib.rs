//! Async `no_std` driver for the Bosch BME280 combined temperature, pressure and humidity sensor.
//!
//! The driver talks to the chip through the [`bus::Bus`] trait, with ready-made adapters for
//! `embedded-hal-async` [I2C](bus::I2c) and [SPI](bus::Spi) peripherals. Raw ADC counts are
//! turned into °C, Pa and %RH with the fixed-point compensation from the datasheet, using the
//! per-device trimming parameters read at initialization.
//!
//! # Examples
//! ```rust,no_run
//! # use embedded_hal_async::delay::DelayNs;
//! # use embedded_hal_async::i2c::I2c;
//! # use bme280_rs::Bme280Result;
//! use bme280_rs::{Bme280, SdoPinState};
//! use bme280_rs::register::ctrl_meas::{Oversampling, PowerMode};
//! # async fn demo<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Bme280Result<(), I::Error> {
//!
//! let mut device = Bme280::new_i2c(i2c, SdoPinState::Low, delay).await?;
//! device.set_oversampling(Oversampling::X1, Oversampling::X4, Oversampling::X1).await?;
//! device.set_mode(PowerMode::Forced).await?;
//!
//! let measurement = device.read_measurement().await?;
//! println!("{:.2} °C", measurement.temperature);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

mod bme280;
mod builder;
pub mod bus;
pub mod calibration;
pub mod config;
pub mod error;
pub mod register;
pub mod sensor;

#[cfg(test)]
mod testing;

pub use bme280::*;
pub use builder::{Bme280Builder, NoBus, NoBusError};
pub use error::Bme280Error;
