use crate::bus::{Bus, I2c, Spi};
use crate::config::Configuration;
use crate::error::Bme280Error;
use crate::{Bme280, Bme280Result, NoDelay, PollPolicy, SdoPinState};
use embedded_hal_async::delay::DelayNs;

/// Marker for the "No bus chosen yet" state in [`Bme280Builder`]
///
/// Building without a bus fails with [`Bme280Error::NoBus`]:
///
/// ```rust
/// # tokio_test::block_on(async {
/// use bme280_rs::{Bme280Builder, Bme280Error};
///
/// let result = Bme280Builder::new().build().await;
/// assert!(matches!(result, Err(Bme280Error::NoBus)));
/// # });
/// ```
pub struct NoBus;

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoBusError;

impl Bus for NoBus {
    type Error = NoBusError;

    async fn read_registers(&mut self, _reg: u8, _data: &mut [u8]) -> Result<(), Self::Error> {
        Err(NoBusError)
    }

    async fn write_registers(&mut self, _reg: u8, _data: &[u8]) -> Result<(), Self::Error> {
        Err(NoBusError)
    }
}

/// Lets you configure and build an initialized [`Bme280`].
///
/// # Examples
///
/// ```rust,no_run
/// # use embedded_hal_async::delay::DelayNs;
/// # use embedded_hal_async::i2c::I2c;
/// # use bme280_rs::Bme280Result;
/// use bme280_rs::{Bme280Builder, SdoPinState};
/// use bme280_rs::config::{Configuration, Preset};
/// # async fn demo<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Bme280Result<(), I::Error> {
///
/// let mut device = Bme280Builder::new()
///     .use_i2c(i2c, SdoPinState::High)
///     .use_delay(delay)
///     .configuration(Configuration::from_preset(Preset::WeatherMonitoring))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Bme280Builder<B = NoBus, D = NoDelay> {
    bus: Option<B>,
    delay: D,
    config: Configuration,
    poll_policy: PollPolicy,
}

impl Bme280Builder<NoBus, NoDelay> {
    pub fn new() -> Self {
        Self {
            bus: None,
            delay: NoDelay,
            config: Configuration::default(),
            poll_policy: PollPolicy::default(),
        }
    }
}

impl Default for Bme280Builder<NoBus, NoDelay> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, D> Bme280Builder<B, D> {
    /// Configures the underlying [`Bme280`] driver to use I2C
    ///
    /// Since the I2C address is derived from the state of the SDO pin, you need to tell the
    /// driver if it is connected to GND or VDDIO using the parameter `sdo_pin_state`.
    pub fn use_i2c<I2cType>(self, i2c: I2cType, sdo_pin_state: SdoPinState) -> Bme280Builder<I2c<I2cType>, D>
    where
        I2cType: embedded_hal_async::i2c::I2c,
    {
        self.use_bus(I2c::new(i2c, sdo_pin_state.into()))
    }

    /// Configures the underlying [`Bme280`] driver to use 4-wire SPI
    pub fn use_spi<SpiType>(self, spi: SpiType) -> Bme280Builder<Spi<SpiType>, D>
    where
        SpiType: embedded_hal_async::spi::SpiDevice,
    {
        self.use_bus(Spi::new(spi))
    }

    /// Configures the underlying [`Bme280`] driver to use any [`Bus`] implementation.
    pub fn use_bus<B2: Bus>(self, bus: B2) -> Bme280Builder<B2, D> {
        Bme280Builder {
            bus: Some(bus),
            delay: self.delay,
            config: self.config,
            poll_policy: self.poll_policy,
        }
    }

    /// Sets the delay provider used between status polls. Defaults to [`NoDelay`].
    pub fn use_delay<D2: DelayNs>(self, delay: D2) -> Bme280Builder<B, D2> {
        Bme280Builder {
            bus: self.bus,
            delay,
            config: self.config,
            poll_policy: self.poll_policy,
        }
    }

    /// Settings to apply once the device has been initialized.
    pub fn configuration(mut self, config: Configuration) -> Self {
        self.config = config;

        self
    }

    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;

        self
    }
}

impl<B, D> Bme280Builder<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Creates the driver, runs [`Bme280::init`] and applies the chosen configuration.
    pub async fn build(self) -> Bme280Result<Bme280<B, D>, B::Error> {
        let bus = self.bus.ok_or(Bme280Error::NoBus)?;

        let mut device = Bme280::new(bus, self.delay);
        device.set_poll_policy(self.poll_policy);
        device.init().await?;

        if &self.config != device.settings() {
            device.apply_configuration(&self.config).await?;
        }

        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::register::ctrl_meas::{CtrlMeas, PowerMode};
    use crate::register::Reg;
    use crate::testing::{FakeBus, FakeDelay};

    #[tokio::test]
    async fn build_without_bus_fails() {
        let result = Bme280Builder::new().build().await;

        assert!(matches!(result, Err(Bme280Error::NoBus)));
    }

    #[tokio::test]
    async fn build_initializes_and_applies_configuration() {
        let device = Bme280Builder::new()
            .use_bus(FakeBus::bme280())
            .use_delay(FakeDelay::default())
            .configuration(Configuration::from_preset(Preset::IndoorNavigation))
            .poll_policy(PollPolicy::Strict)
            .build()
            .await
            .unwrap();

        assert!(device.is_calibrated());
        assert_eq!(&Configuration::from_preset(Preset::IndoorNavigation), device.settings());
        assert_eq!(PollPolicy::Strict, device.poll_policy());

        let (bus, _) = device.release();
        // osrs_t = 2x, osrs_p = 16x, normal mode
        assert_eq!(0b0101_0111, bus.register(CtrlMeas::ADDR));
    }

    #[tokio::test]
    async fn build_with_default_configuration_stays_asleep() {
        let mut device = Bme280Builder::new()
            .use_bus(FakeBus::bme280())
            .build()
            .await
            .unwrap();

        assert_eq!(PowerMode::Sleep, device.mode().await.unwrap());
    }
}
