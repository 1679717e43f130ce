//! ### RESET - Reset register (`0xE0`, 1 byte, Write-only)
//!
//! Writing [`ResetCommand::SoftReset`] restarts the device using the complete power-on-reset
//! procedure. Any other value is ignored by the chip.
//!
//! After the reset the NVM trimming data is copied to the image registers, which is signalled by
//! `STATUS.im_update`. Consult [`Bme280::soft_reset()`](crate::Bme280::soft_reset) for a method
//! that also waits for the copy to finish.
//!
//! ### Examples
//! ```rust,no_run
//! # use bme280_rs::{Bme280, Bme280Result};
//! # use bme280_rs::bus::Bus;
//! # use embedded_hal_async::delay::DelayNs;
//! # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>)
//! #     -> Bme280Result<(), B::Error> {
//! use bme280_rs::register::reset::{Reset, ResetCommand};
//!
//! device.write::<Reset>(&ResetCommand::SoftReset).await?;
//! # Ok(()) }
//! ```
#![doc(alias = "RESET")]
use crate::register::{Reg, Writable};

/// Marker type for RESET (0xE0) register
pub struct Reset;
impl Reg for Reset { const ADDR: u8 = 0xE0; }

/// The payload for the RESET (0xE0) register.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCommand {
    /// Triggers a power-on-reset sequence.
    ///
    /// All user configuration settings are overwritten with their default state.
    SoftReset,
}

impl From<ResetCommand> for u8 {
    fn from(cmd: ResetCommand) -> u8 {
        match cmd {
            ResetCommand::SoftReset => 0xB6,
        }
    }
}

impl Writable for Reset {
    type In = ResetCommand;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (*v).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_encode() {
        let mut buffer = [0u8; 1];
        Reset::encode(&ResetCommand::SoftReset, &mut buffer);
        assert_eq!([0xB6], buffer);
    }
}
