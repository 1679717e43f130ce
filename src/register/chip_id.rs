use crate::register::{Readable, Reg};

/// The value every genuine BME280 reports in the ID register.
pub const BME280_CHIP_ID: u8 = 0x60;

/// Marker struct for the ID (0xD0) register
///
/// - **Length:** 1 byte
/// - **Access:** Read-only
pub struct ChipId;
impl Reg for ChipId { const ADDR: u8 = 0xD0; }

impl Readable for ChipId {
    type Out = u8;

    fn decode(b: &[u8]) -> Self::Out {
        b[0]
    }
}
