use crate::register::{Readable, Reg, UnexpectedValue, Writable};

/// Marker struct for the CTRL_MEAS (0xF4) register
///
/// Holds the temperature and pressure oversampling together with the power mode:
/// `osrs_t[7:5]`, `osrs_p[4:2]` and `mode[1:0]`.
///
/// Writing this register is also what latches a preceding change to
/// [`CTRL_HUM`](crate::register::ctrl_hum::CtrlHum).
pub struct CtrlMeas;
impl Reg for CtrlMeas { const ADDR: u8 = 0xF4; }

impl CtrlMeas {
    pub const OSRS_T_MASK: u8 = 0b1110_0000;
    pub const OSRS_P_MASK: u8 = 0b0001_1100;
    pub const MODE_MASK: u8 = 0b0000_0011;
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CtrlMeasCfg {
    pub osrs_t: Oversampling,
    pub osrs_p: Oversampling,
    pub mode: PowerMode,
}

impl Readable for CtrlMeas {
    type Out = CtrlMeasCfg;

    fn decode(b: &[u8]) -> Self::Out {
        CtrlMeasCfg {
            osrs_t: Oversampling::from_bits(b[0] >> 5),
            osrs_p: Oversampling::from_bits(b[0] >> 2),
            mode: PowerMode::from_bits(b[0]),
        }
    }
}

impl Writable for CtrlMeas {
    type In = CtrlMeasCfg;
    fn encode(v: &Self::In, out: &mut [u8]) {
        let osrs_t: u8 = v.osrs_t.into();
        let osrs_p: u8 = v.osrs_p.into();
        let mode: u8 = v.mode.into();
        out[0] = (osrs_t << 5) | (osrs_p << 2) | mode;
    }
}

/// Oversampling setting shared by the temperature, pressure and humidity channels.
///
/// [`Oversampling::Skipped`] disables the channel entirely; its data registers then hold
/// `0x80000` (or `0x8000` for humidity).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    Skipped,
    X1,
    X2,
    X4,
    X8,
    X16,
}

impl Oversampling {
    /// Decodes a 3-bit register field. The chip treats `0b110` and `0b111` as 16x.
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Oversampling::Skipped,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

impl TryFrom<u8> for Oversampling {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0..=5 => Ok(Oversampling::from_bits(field)),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<Oversampling> for u8 {
    fn from(osr: Oversampling) -> u8 {
        match osr {
            Oversampling::Skipped => 0b000,
            Oversampling::X1 => 0b001,
            Oversampling::X2 => 0b010,
            Oversampling::X4 => 0b011,
            Oversampling::X8 => 0b100,
            Oversampling::X16 => 0b101,
        }
    }
}

/// Power mode of the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// No measurements are performed. Lowest power consumption.
    Sleep,
    /// A single measurement is performed, after which the device returns to sleep.
    Forced,
    /// Measurements are performed continuously, separated by the configured standby time.
    Normal,
}

impl PowerMode {
    /// Decodes the 2-bit mode field. The chip reports both `0b01` and `0b10` as forced.
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => PowerMode::Sleep,
            0b11 => PowerMode::Normal,
            _ => PowerMode::Forced,
        }
    }
}

impl TryFrom<u8> for PowerMode {
    type Error = UnexpectedValue;
    fn try_from(field: u8) -> Result<Self, Self::Error> {
        match field {
            0b00 => Ok(PowerMode::Sleep),
            0b01 => Ok(PowerMode::Forced),
            0b11 => Ok(PowerMode::Normal),
            other => Err(UnexpectedValue(other)),
        }
    }
}

impl From<PowerMode> for u8 {
    fn from(mode: PowerMode) -> u8 {
        match mode {
            PowerMode::Sleep => 0b00,
            PowerMode::Forced => 0b01,
            PowerMode::Normal => 0b11,
        }
    }
}
