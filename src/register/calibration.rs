//! Factory trimming parameters stored in NVM.
//!
//! The BME280 splits its calibration data over two blocks: `calib00..calib25` (0x88 - 0xA1)
//! holds the temperature and pressure words plus `dig_H1`, and `calib26..calib32` (0xE1 - 0xE7)
//! holds the remaining humidity parameters. `dig_H4` and `dig_H5` are 12-bit two's complement
//! values sharing the nibbles of register 0xE5.
use crate::register::{Readable, Reg};

/// Marker struct for the calibration block at 0x88 - 0xA1
///
/// - **Length:** 26 bytes
/// - **Access:** Read-only
pub struct TempPressCalibration;
impl Reg for TempPressCalibration { const ADDR: u8 = 0x88; }

/// Marker struct for the calibration block at 0xE1 - 0xE7
///
/// - **Length:** 7 bytes
/// - **Access:** Read-only
pub struct HumidityCalibration;
impl Reg for HumidityCalibration { const ADDR: u8 = 0xE1; }

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TempPressNvm {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HumidityNvm {
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

impl Readable for TempPressCalibration {
    type Out = TempPressNvm;
    const N: usize = 26;

    fn decode(b: &[u8]) -> Self::Out {
        TempPressNvm {
            dig_t1: u16::from_le_bytes([b[0], b[1]]),
            dig_t2: i16::from_le_bytes([b[2], b[3]]),
            dig_t3: i16::from_le_bytes([b[4], b[5]]),
            dig_p1: u16::from_le_bytes([b[6], b[7]]),
            dig_p2: i16::from_le_bytes([b[8], b[9]]),
            dig_p3: i16::from_le_bytes([b[10], b[11]]),
            dig_p4: i16::from_le_bytes([b[12], b[13]]),
            dig_p5: i16::from_le_bytes([b[14], b[15]]),
            dig_p6: i16::from_le_bytes([b[16], b[17]]),
            dig_p7: i16::from_le_bytes([b[18], b[19]]),
            dig_p8: i16::from_le_bytes([b[20], b[21]]),
            dig_p9: i16::from_le_bytes([b[22], b[23]]),
            // b[24] is register 0xA0, which is unused
            dig_h1: b[25],
        }
    }
}

impl Readable for HumidityCalibration {
    type Out = HumidityNvm;
    const N: usize = 7;

    fn decode(b: &[u8]) -> Self::Out {
        HumidityNvm {
            dig_h2: i16::from_le_bytes([b[0], b[1]]),
            dig_h3: b[2],
            dig_h4: unpack_h4(b[3], b[4]),
            dig_h5: unpack_h5(b[4], b[5]),
            dig_h6: b[6] as i8,
        }
    }
}

/// Sign-extends a 12-bit two's complement value stored in the low bits of `raw`.
pub const fn sign_extend_12(raw: u16) -> i16 {
    if raw & 0x0800 != 0 {
        (raw | 0xF000) as i16
    } else {
        (raw & 0x0FFF) as i16
    }
}

/// `dig_H4` is `0xE4[7:0]` followed by `0xE5[3:0]`.
pub const fn unpack_h4(e4: u8, e5: u8) -> i16 {
    sign_extend_12(((e4 as u16) << 4) | (e5 & 0x0F) as u16)
}

/// `dig_H5` is `0xE6[7:0]` followed by `0xE5[7:4]`.
pub const fn unpack_h5(e5: u8, e6: u8) -> i16 {
    sign_extend_12(((e6 as u16) << 4) | (e5 >> 4) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_extend_boundaries() {
        assert_eq!(0, sign_extend_12(0x000));
        assert_eq!(2047, sign_extend_12(0x7FF));
        assert_eq!(-2048, sign_extend_12(0x800));
        assert_eq!(-1, sign_extend_12(0xFFF));
    }

    #[test]
    fn packed_humidity_nibbles() {
        // H4 = 0x139 (313), H5 = 0x032 (50), sharing 0xE5 = 0x29
        assert_eq!(313, unpack_h4(0x13, 0x29));
        assert_eq!(50, unpack_h5(0x29, 0x03));

        assert_eq!(-2048, unpack_h4(0x80, 0x00));
        assert_eq!(-2048, unpack_h5(0x00, 0x80));
        assert_eq!(-1, unpack_h4(0xFF, 0xFF));
    }

    #[test]
    fn temp_press_decode() {
        let bytes = [
            0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B,
            0x8C, 0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17, 0x00, 0x4B,
        ];
        let nvm = TempPressCalibration::decode(&bytes);
        assert_eq!(27504, nvm.dig_t1);
        assert_eq!(26435, nvm.dig_t2);
        assert_eq!(-1000, nvm.dig_t3);
        assert_eq!(36477, nvm.dig_p1);
        assert_eq!(-10685, nvm.dig_p2);
        assert_eq!(3024, nvm.dig_p3);
        assert_eq!(2855, nvm.dig_p4);
        assert_eq!(140, nvm.dig_p5);
        assert_eq!(-7, nvm.dig_p6);
        assert_eq!(15500, nvm.dig_p7);
        assert_eq!(-14600, nvm.dig_p8);
        assert_eq!(6000, nvm.dig_p9);
        assert_eq!(75, nvm.dig_h1);
    }

    #[test]
    fn humidity_decode() {
        let nvm = HumidityCalibration::decode(&[0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E]);
        assert_eq!(362, nvm.dig_h2);
        assert_eq!(0, nvm.dig_h3);
        assert_eq!(313, nvm.dig_h4);
        assert_eq!(50, nvm.dig_h5);
        assert_eq!(30, nvm.dig_h6);
    }

    #[test]
    fn humidity_decode_negative_packed_values() {
        let nvm = HumidityCalibration::decode(&[0x00, 0x00, 0x00, 0x80, 0x00, 0x80, 0xE2]);
        assert_eq!(-2048, nvm.dig_h4);
        assert_eq!(-2048, nvm.dig_h5);
        assert_eq!(-30, nvm.dig_h6);
    }
}
