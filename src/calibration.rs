use crate::bus::Bus;
use crate::register::calibration::{HumidityCalibration, HumidityNvm, TempPressCalibration, TempPressNvm};
use crate::Bme280Result;

/// Per-device trimming parameters together with the `t_fine` carry-over that links the
/// temperature compensation to the pressure and humidity compensation.
///
/// The arithmetic follows the fixed-point reference from the datasheet (section 4.2.3) and
/// reproduces its results bit for bit. Intermediates are widened to `i64` so that out-of-range
/// ADC counts cannot overflow.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationData {
    dig_t1: u16,
    dig_t2: i16,
    dig_t3: i16,
    dig_p1: u16,
    dig_p2: i16,
    dig_p3: i16,
    dig_p4: i16,
    dig_p5: i16,
    dig_p6: i16,
    dig_p7: i16,
    dig_p8: i16,
    dig_p9: i16,
    dig_h1: u8,
    dig_h2: i16,
    dig_h3: u8,
    dig_h4: i16,
    dig_h5: i16,
    dig_h6: i8,
    t_fine: i32,
}

impl CalibrationData {
    /// Reads both calibration blocks from the device.
    pub async fn new<B: Bus>(bus: &mut B) -> Bme280Result<Self, B::Error> {
        let tp = bus.read::<TempPressCalibration>().await?;
        let hum = bus.read::<HumidityCalibration>().await?;

        Ok(Self::from_nvm(&tp, &hum))
    }

    pub fn from_nvm(tp: &TempPressNvm, hum: &HumidityNvm) -> Self {
        Self {
            dig_t1: tp.dig_t1,
            dig_t2: tp.dig_t2,
            dig_t3: tp.dig_t3,
            dig_p1: tp.dig_p1,
            dig_p2: tp.dig_p2,
            dig_p3: tp.dig_p3,
            dig_p4: tp.dig_p4,
            dig_p5: tp.dig_p5,
            dig_p6: tp.dig_p6,
            dig_p7: tp.dig_p7,
            dig_p8: tp.dig_p8,
            dig_p9: tp.dig_p9,
            dig_h1: tp.dig_h1,
            dig_h2: hum.dig_h2,
            dig_h3: hum.dig_h3,
            dig_h4: hum.dig_h4,
            dig_h5: hum.dig_h5,
            dig_h6: hum.dig_h6,
            t_fine: 0,
        }
    }

    /// Fine temperature produced by the last call to [`compensate_temperature`](Self::compensate_temperature).
    ///
    /// Zero until the first temperature has been compensated.
    pub fn t_fine(&self) -> i32 {
        self.t_fine
    }

    /// Returns the temperature in °C and updates `t_fine`.
    pub fn compensate_temperature(&mut self, adc_t: i32) -> f32 {
        let adc = adc_t as i64;
        let t1 = self.dig_t1 as i64;
        let t2 = self.dig_t2 as i64;
        let t3 = self.dig_t3 as i64;

        let var1 = (((adc >> 3) - (t1 << 1)) * t2) >> 11;
        let var2 = (((((adc >> 4) - t1) * ((adc >> 4) - t1)) >> 12) * t3) >> 14;
        self.t_fine = (var1 + var2) as i32;

        let centi_celsius = (self.t_fine as i64 * 5 + 128) as f32 / 256.0;
        centi_celsius / 100.0
    }

    /// Returns the pressure in Pa, using the `t_fine` left by the previous temperature
    /// compensation.
    ///
    /// Returns `0.0` when the calibration would cause a division by zero.
    pub fn compensate_pressure(&self, adc_p: i32) -> f32 {
        let p1 = self.dig_p1 as i64;
        let p2 = self.dig_p2 as i64;
        let p3 = self.dig_p3 as i64;
        let p4 = self.dig_p4 as i64;
        let p5 = self.dig_p5 as i64;
        let p6 = self.dig_p6 as i64;
        let p7 = self.dig_p7 as i64;
        let p8 = self.dig_p8 as i64;
        let p9 = self.dig_p9 as i64;

        let mut var1 = self.t_fine as i64 - 128000;
        let mut var2 = var1 * var1 * p6;
        var2 += (var1 * p5) << 17;
        var2 += p4 << 35;
        var1 = ((var1 * var1 * p3) >> 8) + ((var1 * p2) << 12);
        var1 = (((1i64 << 47) + var1) * p1) >> 33;

        if var1 == 0 {
            return 0.0;
        }

        let mut p = 1048576 - adc_p as i64;
        p = (((p << 31) - var2) * 3125) / var1;
        let var1 = (p9 * (p >> 13) * (p >> 13)) >> 25;
        let var2 = (p8 * p) >> 19;
        p = ((p + var1 + var2) >> 8) + (p7 << 4);

        // Q24.8
        p as f32 / 256.0
    }

    /// Returns the relative humidity in %, using the `t_fine` left by the previous temperature
    /// compensation. The result is clamped to `0.0..=100.0`.
    pub fn compensate_humidity(&self, adc_h: i32) -> f32 {
        let adc = adc_h as i64;
        let h1 = self.dig_h1 as i64;
        let h2 = self.dig_h2 as i64;
        let h3 = self.dig_h3 as i64;
        let h4 = self.dig_h4 as i64;
        let h5 = self.dig_h5 as i64;
        let h6 = self.dig_h6 as i64;

        let mut v = self.t_fine as i64 - 76800;
        v = ((((adc << 14) - (h4 << 20) - (h5 * v)) + 16384) >> 15)
            * (((((((v * h6) >> 10) * (((v * h3) >> 11) + 32768)) >> 10) + 2097152) * h2 + 8192) >> 14);
        v -= ((((v >> 15) * (v >> 15)) >> 7) * h1) >> 4;
        let v = v.clamp(0, 419430400);

        // Q22.10
        let h = (v >> 12) as f32 / 1024.0;
        h.clamp(0.0, 100.0)
    }
}
