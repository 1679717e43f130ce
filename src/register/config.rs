//! ### CONFIG - Rate, filter and interface options (`0xF5`, 1 byte, R/W)
//!
//! Holds the normal-mode standby time `t_sb[7:5]`, the IIR filter coefficient `filter[4:2]`
//! and the 3-wire SPI enable bit `spi3w_en[0]`.
//!
//! Writes to this register may be ignored by the chip while in normal mode, so configure it
//! in sleep mode.
//!
//! ### Default values
//! 0x00 (0.5 ms standby, filter off, 4-wire SPI)
//!
//! ### Examples
//! ```rust,no_run
//! # use bme280_rs::{Bme280, Bme280Result};
//! # use bme280_rs::bus::Bus;
//! # use embedded_hal_async::delay::DelayNs;
//! # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>)
//! #     -> Bme280Result<(), B::Error> {
//! use bme280_rs::register::config::{Config, ConfigFields, IirFilter, StandbyTime};
//!
//! let data = device.read::<Config>().await?;
//! println!("{:?}", data.filter);
//!
//! device.write::<Config>(&ConfigFields {
//!     standby: StandbyTime::Ms1000,
//!     filter: IirFilter::X4,
//!     spi3w_en: false,
//! }).await?;
//!
//! # Ok(()) }
//! ```

use crate::register::{Readable, Reg, UnexpectedValue, Writable};

/// Marker type for CONFIG (0xF5) register
pub struct Config;
impl Reg for Config { const ADDR: u8 = 0xF5; }

impl Config {
    pub const STANDBY_MASK: u8 = 0b1110_0000;
    pub const FILTER_MASK: u8 = 0b0001_1100;
    pub const SPI3W_EN: u8 = 0b0000_0001;
}

/// The payload for the CONFIG (0xF5) register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigFields {
    /// Inactive duration between two measurements in normal mode.
    pub standby: StandbyTime,
    /// The IIR filter coefficient.
    ///
    /// Read more about the IIR filter in the datasheet section 3.4.4
    pub filter: IirFilter,
    /// Enables the 3-wire SPI interface.
    pub spi3w_en: bool,
}

impl Readable for Config {
    type Out = ConfigFields;

    fn decode(b: &[u8]) -> Self::Out {
        ConfigFields {
            standby: StandbyTime::from_bits(b[0] >> 5),
            filter: IirFilter::from_bits(b[0] >> 2),
            spi3w_en: (b[0] & Self::SPI3W_EN) != 0,
        }
    }
}

impl Writable for Config {
    type In = ConfigFields;

    fn encode(v: &Self::In, out: &mut [u8]) {
        let standby: u8 = v.standby.into();
        let filter: u8 = v.filter.into();
        out[0] = (standby << 5) | (filter << 2) | (v.spi3w_en as u8);
    }
}

/// IIR filter coefficient applied to the temperature and pressure outputs.
///
/// Humidity is not filtered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IirFilter {
    Off,
    X2,
    X4,
    X8,
    X16,
}

impl IirFilter {
    /// Decodes the 3-bit register field. The chip treats `0b101..=0b111` as coefficient 16.
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => IirFilter::Off,
            0b001 => IirFilter::X2,
            0b010 => IirFilter::X4,
            0b011 => IirFilter::X8,
            _ => IirFilter::X16,
        }
    }
}

impl TryFrom<u8> for IirFilter {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0..=4 => Ok(IirFilter::from_bits(field)),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<IirFilter> for u8 {
    fn from(filter: IirFilter) -> u8 {
        match filter {
            IirFilter::Off => 0b000,
            IirFilter::X2 => 0b001,
            IirFilter::X4 => 0b010,
            IirFilter::X8 => 0b011,
            IirFilter::X16 => 0b100,
        }
    }
}

/// Standby time between measurements in normal mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StandbyTime {
    Ms0_5,
    Ms62_5,
    Ms125,
    Ms250,
    Ms500,
    Ms1000,
    Ms10,
    Ms20,
}

impl StandbyTime {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => StandbyTime::Ms0_5,
            0b001 => StandbyTime::Ms62_5,
            0b010 => StandbyTime::Ms125,
            0b011 => StandbyTime::Ms250,
            0b100 => StandbyTime::Ms500,
            0b101 => StandbyTime::Ms1000,
            0b110 => StandbyTime::Ms10,
            _ => StandbyTime::Ms20,
        }
    }

    /// Returns the standby duration in microseconds.
    pub fn as_micros(&self) -> u32 {
        match self {
            StandbyTime::Ms0_5 => 500,
            StandbyTime::Ms62_5 => 62_500,
            StandbyTime::Ms125 => 125_000,
            StandbyTime::Ms250 => 250_000,
            StandbyTime::Ms500 => 500_000,
            StandbyTime::Ms1000 => 1_000_000,
            StandbyTime::Ms10 => 10_000,
            StandbyTime::Ms20 => 20_000,
        }
    }
}

impl TryFrom<u8> for StandbyTime {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0..=7 => Ok(StandbyTime::from_bits(field)),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<StandbyTime> for u8 {
    fn from(standby: StandbyTime) -> u8 {
        match standby {
            StandbyTime::Ms0_5 => 0b000,
            StandbyTime::Ms62_5 => 0b001,
            StandbyTime::Ms125 => 0b010,
            StandbyTime::Ms250 => 0b011,
            StandbyTime::Ms500 => 0b100,
            StandbyTime::Ms1000 => 0b101,
            StandbyTime::Ms10 => 0b110,
            StandbyTime::Ms20 => 0b111,
        }
    }
}
