use crate::register::{Readable, Reg};

/// Marker struct for the data block `press_msb` (0xF7) .. `hum_lsb` (0xFE)
///
/// - **Length:** 8 bytes
/// - **Access:** Read-only
///
/// The whole block is read in one burst so that all three channels come from the same
/// conversion.
pub struct Data;
impl Reg for Data { const ADDR: u8 = 0xF7; }

/// Uncompensated ADC counts for one conversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// 20-bit pressure count
    pub pressure: i32,
    /// 20-bit temperature count
    pub temperature: i32,
    /// 16-bit humidity count
    pub humidity: i32,
}

impl Readable for Data {
    type Out = RawSample;
    const N: usize = 8;

    fn decode(b: &[u8]) -> Self::Out {
        RawSample {
            pressure: ((b[0] as i32) << 12) | ((b[1] as i32) << 4) | ((b[2] as i32) >> 4),
            temperature: ((b[3] as i32) << 12) | ((b[4] as i32) << 4) | ((b[5] as i32) >> 4),
            humidity: ((b[6] as i32) << 8) | (b[7] as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_decode() {
        let sample = Data::decode(&[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30]);
        assert_eq!(415148, sample.pressure);
        assert_eq!(519888, sample.temperature);
        assert_eq!(30000, sample.humidity);
    }

    #[test]
    fn data_decode_drops_low_nibble_of_xlsb() {
        let sample = Data::decode(&[0xFF, 0xFF, 0xFF, 0x80, 0x00, 0x0F, 0xFF, 0xFF]);
        assert_eq!(0xFFFFF, sample.pressure);
        assert_eq!(0x80000, sample.temperature);
        assert_eq!(0xFFFF, sample.humidity);
    }
}
