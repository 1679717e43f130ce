use crate::error::Bme280Error;
use crate::register::{Readable, Writable};
use crate::Bme280Result;
use embedded_hal::i2c::SevenBitAddress;

/// Longest register block the driver transfers in one go (the 0x88 calibration block).
pub const MAX_REG_BYTES: usize = 26;

/// Register-level access to a BME280.
///
/// Implementors only have to provide the two raw transfers. The typed [`Bus::read`] and
/// [`Bus::write`] helpers build on them using the register markers in [`crate::register`].
///
/// Reads of more than one byte must be burst reads starting at `reg`, the chip auto-increments
/// the address.
#[allow(async_fn_in_trait)]
pub trait Bus {
    type Error;

    fn read_registers(&mut self, reg: u8, data: &mut [u8]) -> impl Future<Output = Result<(), Self::Error>>;

    fn write_registers(&mut self, reg: u8, data: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;

    async fn read<R: Readable>(&mut self) -> Bme280Result<R::Out, Self::Error> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..R::N];
        self.read_registers(R::ADDR, data).await.map_err(Bme280Error::Bus)?;

        Ok(R::decode(data))
    }

    async fn write<W: Writable>(&mut self, v: &W::In) -> Bme280Result<(), Self::Error> {
        let mut buf = [0u8; MAX_REG_BYTES];
        let data = &mut buf[..W::N];
        W::encode(v, data);
        self.write_registers(W::ADDR, data).await.map_err(Bme280Error::Bus)
    }
}

pub struct I2c<I2cType> {
    i2c: I2cType,
    address: SevenBitAddress,
}

impl<I2cType> I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    pub fn new(i2c: I2cType, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit address this adapter talks to.
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Releases the underlying I2C peripheral.
    pub fn release(self) -> I2cType {
        self.i2c
    }
}

impl<I2cType> Bus for I2c<I2cType>
where
    I2cType: embedded_hal_async::i2c::I2c,
{
    type Error = <I2cType as embedded_hal_async::i2c::ErrorType>::Error;

    async fn read_registers(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[reg], data).await?;

        Ok(())
    }

    async fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        use embedded_hal::i2c::Operation;
        // Adjacent writes are sent without a repeated start, the chip sees `reg` followed by data.
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&[reg]), Operation::Write(data)],
        ).await?;

        Ok(())
    }
}

pub struct Spi<SpiType> {
    spi: SpiType,
}

impl<SpiType> Spi<SpiType>
where
    SpiType: embedded_hal_async::spi::SpiDevice,
{
    /// Bit 7 of the control byte selects a read.
    pub const READ: u8 = 0x80;

    pub fn new(spi: SpiType) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI device.
    pub fn release(self) -> SpiType {
        self.spi
    }
}

impl<SpiType> Bus for Spi<SpiType>
where
    SpiType: embedded_hal_async::spi::SpiDevice,
{
    type Error = <SpiType as embedded_hal_async::spi::ErrorType>::Error;

    async fn read_registers(&mut self, reg: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        use embedded_hal::spi::Operation;
        self.spi.transaction(
            &mut [Operation::Write(&[reg | Self::READ]), Operation::Read(data)],
        ).await?;

        Ok(())
    }

    async fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        // SPI writes do not auto-increment, every data byte is preceded by its own control byte.
        let mut frame = [0u8; 2 * MAX_REG_BYTES];
        let len = data.len().min(MAX_REG_BYTES);
        for (i, byte) in data[..len].iter().enumerate() {
            frame[2 * i] = reg.wrapping_add(i as u8) & !Self::READ;
            frame[2 * i + 1] = *byte;
        }
        self.spi.write(&frame[..2 * len]).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::chip_id::ChipId;
    use crate::register::config::{Config, ConfigFields, IirFilter, StandbyTime};
    use core::convert::Infallible;
    use embedded_hal_async::i2c::{ErrorType as I2cErrorType, Operation as I2cOperation};
    use embedded_hal_async::spi::{ErrorType as SpiErrorType, Operation as SpiOperation};

    #[derive(Default)]
    struct RecordingI2c {
        writes: Vec<(u8, Vec<u8>)>,
        response: Vec<u8>,
    }

    impl I2cErrorType for RecordingI2c {
        type Error = Infallible;
    }

    impl embedded_hal_async::i2c::I2c for RecordingI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [I2cOperation<'_>],
        ) -> Result<(), Self::Error> {
            let mut written = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    I2cOperation::Write(bytes) => written.extend_from_slice(bytes),
                    I2cOperation::Read(buf) => buf.copy_from_slice(&self.response[..buf.len()]),
                }
            }
            self.writes.push((address, written));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSpi {
        written: Vec<Vec<u8>>,
        response: Vec<u8>,
    }

    impl SpiErrorType for RecordingSpi {
        type Error = Infallible;
    }

    impl embedded_hal_async::spi::SpiDevice for RecordingSpi {
        async fn transaction(
            &mut self,
            operations: &mut [SpiOperation<'_, u8>],
        ) -> Result<(), Self::Error> {
            let mut written = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    SpiOperation::Write(bytes) => written.extend_from_slice(bytes),
                    SpiOperation::Read(buf) => buf.copy_from_slice(&self.response[..buf.len()]),
                    _ => unimplemented!(),
                }
            }
            self.written.push(written);
            Ok(())
        }
    }

    #[tokio::test]
    async fn i2c_read_sends_register_address() {
        let mut bus = I2c::new(RecordingI2c { response: vec![0x60], ..Default::default() }, 0x76);
        let id = bus.read::<ChipId>().await.unwrap();

        assert_eq!(0x60, id);
        let i2c = bus.release();
        assert_eq!(vec![(0x76, vec![0xD0])], i2c.writes);
    }

    #[tokio::test]
    async fn i2c_write_sends_register_then_payload() {
        let mut bus = I2c::new(RecordingI2c::default(), 0x77);
        bus.write::<Config>(&ConfigFields {
            standby: StandbyTime::Ms1000,
            filter: IirFilter::Off,
            spi3w_en: false,
        }).await.unwrap();

        let i2c = bus.release();
        assert_eq!(vec![(0x77, vec![0xF5, 0xA0])], i2c.writes);
    }

    #[tokio::test]
    async fn spi_read_sets_read_bit() {
        let mut bus = Spi::new(RecordingSpi { response: vec![0x60], ..Default::default() });
        let id = bus.read::<ChipId>().await.unwrap();

        assert_eq!(0x60, id);
        assert_eq!(vec![vec![0xD0]], bus.release().written);
    }

    #[tokio::test]
    async fn spi_write_clears_read_bit_for_every_byte() {
        let mut bus = Spi::new(RecordingSpi::default());
        bus.write_registers(0xF4, &[0x27, 0xA0]).await.unwrap();

        assert_eq!(vec![vec![0x74, 0x27, 0x75, 0xA0]], bus.release().written);
    }
}
