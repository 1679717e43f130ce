use crate::register::{Readable, Reg};

/// Marker struct for the STATUS (0xF3) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
///
/// Used with [`Bme280::read::<Status>()`](crate::Bme280::read) or the convenience method
/// [`Bme280::status`](crate::Bme280::status).
pub struct Status;

impl Reg for Status { const ADDR: u8 = 0xF3; }

impl Status {
    pub const MEASURING: u8 = 0b0000_1000;
    pub const IM_UPDATE: u8 = 0b0000_0001;
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags {
    measuring: bool,
    im_update: bool,
}

impl StatusFlags {
    pub fn new(measuring: bool, im_update: bool) -> Self {
        Self { measuring, im_update }
    }

    /// Is a conversion running?
    ///
    /// Set while a conversion is in progress and cleared when the results have been transferred
    /// to the data registers.
    pub fn measuring(&self) -> bool { self.measuring }

    /// Is the NVM data being copied to the image registers?
    ///
    /// Set at power-on and after a soft reset, cleared when the copy is done.
    pub fn im_update(&self) -> bool { self.im_update }
}

impl Readable for Status {
    type Out = StatusFlags;
    fn decode(b: &[u8]) -> Self::Out {
        StatusFlags {
            measuring: (b[0] & Self::MEASURING) != 0,
            im_update: (b[0] & Self::IM_UPDATE) != 0,
        }
    }
}
