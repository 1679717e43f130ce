use crate::bus::Bus;
use crate::register::calibration::{HumidityCalibration, TempPressCalibration};
use crate::register::chip_id::{ChipId, BME280_CHIP_ID};
use crate::register::data::Data;
use crate::register::status::Status;
use crate::register::Reg;
use embedded_hal_async::delay::DelayNs;
use heapless::{Deque, Vec};

/// Calibration block 0x88..0xA1 holding the worked example from the datasheet and `dig_H1` = 75.
pub const TEMP_PRESS_CALIBRATION: [u8; 26] = [
    0x70, 0x6B, 0x43, 0x67, 0x18, 0xFC, 0x7D, 0x8E, 0x43, 0xD6, 0xD0, 0x0B, 0x27, 0x0B, 0x8C,
    0x00, 0xF9, 0xFF, 0x8C, 0x3C, 0xF8, 0xC6, 0x70, 0x17, 0x00, 0x4B,
];

/// Calibration block 0xE1..0xE7: H2 = 362, H3 = 0, H4 = 313, H5 = 50, H6 = 30.
pub const HUMIDITY_CALIBRATION: [u8; 7] = [0x6A, 0x01, 0x00, 0x13, 0x29, 0x03, 0x1E];

/// Data block with adc_P = 415148, adc_T = 519888 and adc_H = 30000.
pub const SAMPLE_DATA: [u8; 8] = [0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FakeBusError;

/// An in-memory BME280 register file.
///
/// Reads return the stored bytes, writes update them and are logged in order. Reads of STATUS
/// return scripted values first, if any were queued.
pub struct FakeBus {
    regs: [u8; 256],
    reads: [u32; 256],
    writes: Vec<(u8, u8), 256>,
    status_script: Deque<u8, 64>,
    fail_on: Option<u8>,
}

impl FakeBus {
    /// An empty register file, every register reads 0.
    pub fn new() -> Self {
        FakeBus {
            regs: [0u8; 256],
            reads: [0u32; 256],
            writes: Vec::new(),
            status_script: Deque::new(),
            fail_on: None,
        }
    }

    /// A register file that looks like a freshly powered BME280 with a conversion in the data
    /// registers.
    pub fn bme280() -> Self {
        let mut bus = Self::new();
        bus.with_register(ChipId::ADDR, BME280_CHIP_ID);
        bus.with_registers(TempPressCalibration::ADDR, &TEMP_PRESS_CALIBRATION);
        bus.with_registers(HumidityCalibration::ADDR, &HUMIDITY_CALIBRATION);
        bus.with_registers(Data::ADDR, &SAMPLE_DATA);

        bus
    }

    pub fn with_register(&mut self, reg: u8, value: u8) {
        self.regs[reg as usize] = value;
    }

    pub fn with_registers(&mut self, reg: u8, values: &[u8]) {
        let start = reg as usize;
        self.regs[start..start + values.len()].copy_from_slice(values);
    }

    /// Queues values returned by subsequent STATUS reads, in order.
    pub fn with_status_sequence(&mut self, values: &[u8]) {
        for v in values {
            self.status_script.push_back(*v).unwrap();
        }
    }

    /// Makes every access touching `reg` fail.
    pub fn fail_on(&mut self, reg: u8) {
        self.fail_on = Some(reg);
    }

    pub fn register(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    /// Number of transfers that started at `reg`.
    pub fn read_count(&self, reg: u8) -> u32 {
        self.reads[reg as usize]
    }

    /// All writes as `(register, value)` pairs in the order they reached the bus.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.reads = [0u32; 256];
    }

    fn touches_failing(&self, reg: u8, len: usize) -> bool {
        match self.fail_on {
            Some(failing) => (reg as usize..reg as usize + len).contains(&(failing as usize)),
            None => false,
        }
    }
}

impl Bus for FakeBus {
    type Error = FakeBusError;

    async fn read_registers(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        if self.touches_failing(reg, data.len()) {
            return Err(FakeBusError);
        }
        self.reads[reg as usize] += 1;

        let start = reg as usize;
        data.copy_from_slice(&self.regs[start..start + data.len()]);
        if reg == Status::ADDR {
            if let Some(status) = self.status_script.pop_front() {
                data[0] = status;
            }
        }

        Ok(())
    }

    async fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        if self.touches_failing(reg, data.len()) {
            return Err(FakeBusError);
        }

        for (i, value) in data.iter().enumerate() {
            let addr = reg.wrapping_add(i as u8);
            self.regs[addr as usize] = *value;
            self.writes.push((addr, *value)).unwrap();
        }

        Ok(())
    }
}

/// A delay that returns immediately and remembers what was asked of it.
#[derive(Default)]
pub struct FakeDelay {
    pub calls: u32,
    pub total_ns: u64,
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += ns as u64;
    }

    async fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000)).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000)).await;
    }
}
