//! Errors that can occur when using the BME280 device.
//!
//! This module provides an error type that encapsulates all possible errors that can occur during communication with BME280.
//! It is generic over the underlying bus (spi/i2c) error type.

/// This represents all possible errors that can occur when using the BME280 device.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bme280Error<BusError> {
    /// No bus was supplied to the [`Bme280Builder`](crate::Bme280Builder).
    NoBus,

    /// An error has occurred in the SPI / I2C driver
    Bus(BusError),

    /// A setting was given a value outside of its valid range.
    ///
    /// The device and the cached settings are left untouched.
    InvalidArgument,

    /// The ID register did not read `0x60`.
    ///
    /// Holds the value that was read. `0x56`..`0x58` indicate a BMP280, `0x00` or `0xFF` usually
    /// indicate a wiring problem.
    ChipIdMismatch(u8),

    /// A status poll did not complete in time.
    ///
    /// Only returned when [`PollPolicy::Strict`](crate::PollPolicy::Strict) is in effect.
    Timeout,
}
