use crate::register::ctrl_meas::Oversampling;
use crate::register::{Readable, Reg, Writable};

/// Marker struct for the CTRL_HUM (0xF2) register
///
/// Only `osrs_h[2:0]` is used, the remaining bits are reserved.
///
/// **Note:** Changes to this register only become effective after a write to
/// [`CTRL_MEAS`](crate::register::ctrl_meas::CtrlMeas).
pub struct CtrlHum;
impl Reg for CtrlHum { const ADDR: u8 = 0xF2; }

impl CtrlHum {
    pub const OSRS_H_MASK: u8 = 0b0000_0111;
}

impl Readable for CtrlHum {
    type Out = Oversampling;

    fn decode(b: &[u8]) -> Self::Out {
        Oversampling::from_bits(b[0])
    }
}

impl Writable for CtrlHum {
    type In = Oversampling;
    fn encode(v: &Self::In, out: &mut [u8]) {
        out[0] = (*v).into();
    }
}
