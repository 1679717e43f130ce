//! Typed register catalog for the BME280.
//!
//! Every register (or fixed-size register block) is represented by a marker type implementing
//! [`Reg`], and [`Readable`] and/or [`Writable`] depending on its access mode. The marker carries
//! the address, the transfer length and the encoding of its payload, so the bus layer can stay
//! completely generic.
pub mod calibration;
pub mod chip_id;
pub mod config;
pub mod ctrl_hum;
pub mod ctrl_meas;
pub mod data;
pub mod reset;
pub mod status;

/// A raw field value that does not map to any variant of the target enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnexpectedValue(pub u8);

pub trait Reg { const ADDR: u8; }

pub trait Readable: Reg {
    type Out;
    const N: usize = 1;
    fn decode(b: &[u8]) -> Self::Out;
}

pub trait Writable: Reg {
    type In;
    const N: usize = 1;
    fn encode(v: &Self::In, out: &mut [u8]);
}
