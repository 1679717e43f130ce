use crate::bus::{Bus, I2c, Spi};
use crate::calibration::CalibrationData;
use crate::config::Configuration;
use crate::error::Bme280Error;
use crate::register::chip_id::{ChipId, BME280_CHIP_ID};
use crate::register::config::{Config, IirFilter, StandbyTime};
use crate::register::ctrl_hum::CtrlHum;
use crate::register::ctrl_meas::{CtrlMeas, Oversampling, PowerMode};
use crate::register::data::{Data, RawSample};
use crate::register::reset::{Reset, ResetCommand};
use crate::register::status::{Status, StatusFlags};
use crate::register::{Readable, Reg, Writable};
use embedded_hal::i2c::SevenBitAddress;
use embedded_hal_async::delay::DelayNs;

/// Type alias for a Bme280 chip communicating over I2C
pub type Bme280I2c<T, D> = Bme280<I2c<T>, D>;

/// Type alias for a Bme280 chip communicating over SPI
pub type Bme280Spi<T, D> = Bme280<Spi<T>, D>;

/// Type alias used to simplify return types throughout the driver
pub type Bme280Result<T, BusError> = Result<T, Bme280Error<BusError>>;

const RESET_POLL_ATTEMPTS: u8 = 20;
const RESET_POLL_INTERVAL_MS: u32 = 2;
const MEASUREMENT_POLL_ATTEMPTS: u8 = 50;
const MEASUREMENT_POLL_INTERVAL_MS: u32 = 5;

/// Main Bme280 driver struct
///
/// Owns the bus and the delay provider. All operations take `&mut self`, so one instance can
/// only ever run one bus sequence at a time. To share a device between tasks, wrap it in a
/// mutex, see [`crate::sensor`].
pub struct Bme280<B, D> {
    pub(crate) bus: B,
    pub(crate) delay: D,
    calibration: Option<CalibrationData>,
    settings: Configuration,
    poll_policy: PollPolicy,
}

impl<T, D> Bme280I2c<T, D>
where
    T: embedded_hal_async::i2c::I2c,
    D: DelayNs,
{
    /// Constructs a new Bme280 driver instance that communicates over I2C and initializes it.
    ///
    /// See [`Bme280::init`] for what initialization involves.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use embedded_hal_async::delay::DelayNs;
    /// # use embedded_hal_async::i2c::I2c;
    /// # use bme280_rs::Bme280Result;
    ///  use bme280_rs::{Bme280, SdoPinState};
    /// # async fn demo<I: I2c, D: DelayNs>(i2c: I, delay: D) -> Bme280Result<(), I::Error> {
    ///
    ///  let mut device = Bme280::new_i2c(i2c, SdoPinState::Low, delay).await?;
    ///  let measurement = device.read_measurement().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new_i2c(
        i2c: T,
        sdo_pin_state: SdoPinState,
        delay: D,
    ) -> Bme280Result<Self, <I2c<T> as Bus>::Error> {
        let mut device = Self::new(I2c::new(i2c, sdo_pin_state.into()), delay);
        device.init().await?;

        Ok(device)
    }
}

impl<T, D> Bme280Spi<T, D>
where
    T: embedded_hal_async::spi::SpiDevice,
    D: DelayNs,
{
    /// Constructs a new Bme280 driver instance that communicates over 4-wire SPI and initializes it.
    ///
    /// See [`Bme280::init`] for what initialization involves.
    pub async fn new_spi(spi: T, delay: D) -> Bme280Result<Self, <Spi<T> as Bus>::Error> {
        let mut device = Self::new(Spi::new(spi), delay);
        device.init().await?;

        Ok(device)
    }
}

impl<B, D> Bme280<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Creates a driver around `bus` without touching the device.
    ///
    /// Until [`init`](Self::init) has succeeded no calibration is loaded and every
    /// compensation returns `0.0`.
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            calibration: None,
            settings: Configuration::default(),
            poll_policy: PollPolicy::default(),
        }
    }

    /// Brings the device into a known state.
    ///
    /// This method will:
    /// - Forget any previously loaded calibration.
    /// - Verify that the ID register reads `0x60`.
    /// - Perform a soft reset.
    /// - Load the calibration coefficients from NVM.
    /// - Apply [`Configuration::default()`].
    ///
    /// The first failing step aborts the sequence and its error is returned.
    pub async fn init(&mut self) -> Bme280Result<(), B::Error> {
        self.calibration = None;

        let id = self.read_chip_id().await?;
        if id != BME280_CHIP_ID {
            warn!("unexpected chip id {:#x}", id);
            return Err(Bme280Error::ChipIdMismatch(id));
        }

        self.soft_reset().await?;
        self.read_calibration().await?;

        let defaults = Configuration::default();
        self.set_oversampling(
            defaults.temperature_oversampling,
            defaults.pressure_oversampling,
            defaults.humidity_oversampling,
        )
        .await?;
        self.set_filter(defaults.iir_filter).await?;
        self.set_standby(defaults.standby_time).await?;
        self.set_mode(PowerMode::Sleep).await?;

        debug!("bme280 initialized");
        Ok(())
    }

    /// Read a register (or fixed-size register block) using a **typed marker**.
    ///
    /// You pass a marker type from [`crate::register`] (e.g. `register::ctrl_meas::CtrlMeas`),
    /// and you get back its decoded value (`R::Out`). The transfer length and address come from
    /// `R::N` and `R::ADDR`.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use bme280_rs::{register, Bme280, Bme280Result};
    /// # use bme280_rs::bus::Bus;
    /// # use embedded_hal_async::delay::DelayNs;
    /// # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>) -> Bme280Result<(), B::Error> {
    /// let id: u8 = device.read::<register::chip_id::ChipId>().await?;
    /// assert_eq!(id, 0x60);
    /// # Ok(()) }
    /// ```
    pub async fn read<R: Readable>(&mut self) -> Bme280Result<R::Out, B::Error> {
        self.bus.read::<R>().await
    }

    /// Write a register using a **typed marker**.
    ///
    /// This performs a direct write of all fields and bypasses the cached
    /// [`settings`](Self::settings). Prefer the `set_*` methods, which only touch their own
    /// bits.
    pub async fn write<W: Writable>(&mut self, v: &W::In) -> Bme280Result<(), B::Error> {
        self.bus.write::<W>(v).await
    }

    /// Reads the ID (0xD0) register.
    pub async fn read_chip_id(&mut self) -> Bme280Result<u8, B::Error> {
        let id = self.bus.read::<ChipId>().await?;
        debug!("chip id {:#x}", id);

        Ok(id)
    }

    /// Determines if a BME280 device is connected by reading the ID (0xD0) register.
    pub async fn is_connected(&mut self) -> Bme280Result<bool, B::Error> {
        Ok(self.read_chip_id().await? == BME280_CHIP_ID)
    }

    /// Returns the status from the STATUS (0xF3) register.
    pub async fn status(&mut self) -> Bme280Result<StatusFlags, B::Error> {
        self.bus.read::<Status>().await
    }

    /// Triggers a soft reset and waits for the NVM data to be copied.
    ///
    /// `STATUS.im_update` is polled up to 20 times, 2 ms apart. If it never clears the reset
    /// is still reported as successful, unless [`PollPolicy::Strict`] is in effect.
    ///
    /// **Note:** This resets the chip to its power-on defaults, the cached
    /// [`settings`](Self::settings) are not updated.
    pub async fn soft_reset(&mut self) -> Bme280Result<(), B::Error> {
        self.bus.write::<Reset>(&ResetCommand::SoftReset).await?;
        debug!("soft reset issued");

        if !self.wait_while(Status::IM_UPDATE, RESET_POLL_ATTEMPTS, RESET_POLL_INTERVAL_MS).await? {
            self.poll_timed_out("im_update")?;
        }

        Ok(())
    }

    /// Loads the calibration coefficients from NVM.
    ///
    /// The previous calibration is kept if either block fails to read.
    pub async fn read_calibration(&mut self) -> Bme280Result<(), B::Error> {
        let calibration = CalibrationData::new(&mut self.bus).await?;
        self.calibration = Some(calibration);
        debug!("calibration loaded");

        Ok(())
    }

    /// Sets the oversampling of the temperature, pressure and humidity channels.
    ///
    /// Accepts [`Oversampling`] values or their register ordinals `0..=5`. Anything else yields
    /// [`Bme280Error::InvalidArgument`] before the bus is touched.
    ///
    /// CTRL_HUM is updated first, then CTRL_MEAS is always rewritten (keeping the mode bits)
    /// since the humidity setting only takes effect on a CTRL_MEAS write.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use bme280_rs::{Bme280, Bme280Result};
    /// # use bme280_rs::bus::Bus;
    /// # use embedded_hal_async::delay::DelayNs;
    /// # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>) -> Bme280Result<(), B::Error> {
    /// use bme280_rs::register::ctrl_meas::Oversampling;
    ///
    /// device.set_oversampling(Oversampling::X2, Oversampling::X16, Oversampling::X1).await?;
    /// # Ok(()) }
    /// ```
    pub async fn set_oversampling<T, P, H>(
        &mut self,
        temperature: T,
        pressure: P,
        humidity: H,
    ) -> Bme280Result<(), B::Error>
    where
        T: TryInto<Oversampling>,
        P: TryInto<Oversampling>,
        H: TryInto<Oversampling>,
    {
        let (Ok(osrs_t), Ok(osrs_p), Ok(osrs_h)) =
            (temperature.try_into(), pressure.try_into(), humidity.try_into())
        else {
            return Err(Bme280Error::InvalidArgument);
        };

        self.update_bits::<CtrlHum>(CtrlHum::OSRS_H_MASK, osrs_h.into()).await?;

        let current = self.read_byte(CtrlMeas::ADDR).await?;
        let osrs_t_bits: u8 = osrs_t.into();
        let osrs_p_bits: u8 = osrs_p.into();
        let ctrl_meas = (current & CtrlMeas::MODE_MASK) | (osrs_t_bits << 5) | (osrs_p_bits << 2);
        self.write_byte(CtrlMeas::ADDR, ctrl_meas).await?;

        self.settings.temperature_oversampling = osrs_t;
        self.settings.pressure_oversampling = osrs_p;
        self.settings.humidity_oversampling = osrs_h;

        Ok(())
    }

    /// Sets the IIR filter coefficient. Accepts [`IirFilter`] values or ordinals `0..=4`.
    pub async fn set_filter<F>(&mut self, filter: F) -> Bme280Result<(), B::Error>
    where
        F: TryInto<IirFilter>,
    {
        let filter = filter.try_into().map_err(|_| Bme280Error::InvalidArgument)?;
        let bits: u8 = filter.into();
        self.update_bits::<Config>(Config::FILTER_MASK, bits << 2).await?;
        self.settings.iir_filter = filter;

        Ok(())
    }

    /// Sets the normal-mode standby time. Accepts [`StandbyTime`] values or ordinals `0..=7`.
    pub async fn set_standby<S>(&mut self, standby: S) -> Bme280Result<(), B::Error>
    where
        S: TryInto<StandbyTime>,
    {
        let standby = standby.try_into().map_err(|_| Bme280Error::InvalidArgument)?;
        let bits: u8 = standby.into();
        self.update_bits::<Config>(Config::STANDBY_MASK, bits << 5).await?;
        self.settings.standby_time = standby;

        Ok(())
    }

    /// Sets the power mode. Accepts [`PowerMode`] values or the ordinals `0`, `1` and `3`.
    ///
    /// Entering [`PowerMode::Forced`] starts a single conversion.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use bme280_rs::{Bme280, Bme280Result};
    /// # use bme280_rs::bus::Bus;
    /// # use embedded_hal_async::delay::DelayNs;
    /// # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>) -> Bme280Result<(), B::Error> {
    /// use bme280_rs::register::ctrl_meas::PowerMode;
    ///
    /// device.set_mode(PowerMode::Normal).await?;
    /// # Ok(()) }
    /// ```
    pub async fn set_mode<M>(&mut self, mode: M) -> Bme280Result<(), B::Error>
    where
        M: TryInto<PowerMode>,
    {
        let mode = mode.try_into().map_err(|_| Bme280Error::InvalidArgument)?;
        self.update_bits::<CtrlMeas>(CtrlMeas::MODE_MASK, mode.into()).await?;
        self.settings.mode = mode;

        Ok(())
    }

    /// Reads the current power mode from the CTRL_MEAS (0xF4) register
    pub async fn mode(&mut self) -> Bme280Result<PowerMode, B::Error> {
        Ok(self.bus.read::<CtrlMeas>().await?.mode)
    }

    /// Applies every setting of `config`: oversampling, filter, standby and finally the mode.
    pub async fn apply_configuration(&mut self, config: &Configuration) -> Bme280Result<(), B::Error> {
        self.set_oversampling(
            config.temperature_oversampling,
            config.pressure_oversampling,
            config.humidity_oversampling,
        )
        .await?;
        self.set_filter(config.iir_filter).await?;
        self.set_standby(config.standby_time).await?;
        self.set_mode(config.mode).await?;

        Ok(())
    }

    /// Reads the uncompensated ADC counts of the last conversion in one burst.
    pub async fn read_raw(&mut self) -> Bme280Result<RawSample, B::Error> {
        self.bus.read::<Data>().await
    }

    /// Acquires and compensates one measurement.
    ///
    /// In [`PowerMode::Forced`] a new conversion is triggered first and `STATUS.measuring` is
    /// polled up to 50 times, 5 ms apart. The data registers are read even if the conversion
    /// did not finish in time, unless [`PollPolicy::Strict`] is in effect. In the other modes
    /// the data registers are read as they are.
    ///
    /// Temperature is always compensated first since pressure and humidity depend on it.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use bme280_rs::{Bme280, Bme280Result};
    /// # use bme280_rs::bus::Bus;
    /// # use embedded_hal_async::delay::DelayNs;
    /// # async fn demo<B: Bus, D: DelayNs>(mut device: Bme280<B, D>) -> Bme280Result<(), B::Error> {
    /// let data = device.read_measurement().await?;
    /// println!("{} °C, {} Pa, {} %RH", data.temperature, data.pressure, data.humidity);
    /// # Ok(()) }
    /// ```
    pub async fn read_measurement(&mut self) -> Bme280Result<Measurement, B::Error> {
        if self.settings.mode == PowerMode::Forced {
            self.update_bits::<CtrlMeas>(CtrlMeas::MODE_MASK, PowerMode::Forced.into()).await?;

            if !self.wait_while(Status::MEASURING, MEASUREMENT_POLL_ATTEMPTS, MEASUREMENT_POLL_INTERVAL_MS).await? {
                self.poll_timed_out("measuring")?;
            }
        }

        let raw = self.read_raw().await?;
        let temperature = self.compensate_temperature(raw.temperature);
        let pressure = self.compensate_pressure(raw.pressure);
        let humidity = self.compensate_humidity(raw.humidity);

        Ok(Measurement {
            temperature,
            pressure,
            humidity,
        })
    }

    /// Converts a raw temperature count to °C and updates `t_fine`.
    ///
    /// Returns `0.0` if no calibration is loaded.
    pub fn compensate_temperature(&mut self, adc_t: i32) -> f32 {
        match self.calibration.as_mut() {
            Some(calibration) => calibration.compensate_temperature(adc_t),
            None => 0.0,
        }
    }

    /// Converts a raw pressure count to Pa using the most recent `t_fine`.
    ///
    /// Returns `0.0` if no calibration is loaded or the calibration is degenerate. Use
    /// [`is_calibrated`](Self::is_calibrated) to tell the first case apart from a real reading.
    pub fn compensate_pressure(&self, adc_p: i32) -> f32 {
        match self.calibration.as_ref() {
            Some(calibration) => calibration.compensate_pressure(adc_p),
            None => 0.0,
        }
    }

    /// Converts a raw humidity count to %RH using the most recent `t_fine`.
    ///
    /// Returns `0.0` if no calibration is loaded.
    pub fn compensate_humidity(&self, adc_h: i32) -> f32 {
        match self.calibration.as_ref() {
            Some(calibration) => calibration.compensate_humidity(adc_h),
            None => 0.0,
        }
    }

    async fn read_byte(&mut self, reg: u8) -> Bme280Result<u8, B::Error> {
        let mut value = [0u8; 1];
        self.bus.read_registers(reg, &mut value).await.map_err(Bme280Error::Bus)?;

        Ok(value[0])
    }

    async fn write_byte(&mut self, reg: u8, value: u8) -> Bme280Result<(), B::Error> {
        trace!("write {:#x} <- {:#x}", reg, value);
        self.bus.write_registers(reg, &[value]).await.map_err(Bme280Error::Bus)
    }

    /// Replaces the bits selected by `mask`, skipping the write when nothing changes.
    async fn update_bits<R: Reg>(&mut self, mask: u8, value: u8) -> Bme280Result<(), B::Error> {
        let current = self.read_byte(R::ADDR).await?;
        let new = (current & !mask) | (value & mask);
        if new == current {
            trace!("{:#x} already {:#x}", R::ADDR, current);
            return Ok(());
        }

        self.write_byte(R::ADDR, new).await
    }

    /// Polls STATUS until none of `busy_bits` is set. Returns `false` if the bits were still
    /// set after `attempts` reads.
    async fn wait_while(&mut self, busy_bits: u8, attempts: u8, interval_ms: u32) -> Bme280Result<bool, B::Error> {
        for _ in 0..attempts {
            let status = self.read_byte(Status::ADDR).await?;
            if status & busy_bits == 0 {
                return Ok(true);
            }

            self.delay.delay_ms(interval_ms).await;
        }

        Ok(false)
    }

    fn poll_timed_out(&self, flag: &str) -> Bme280Result<(), B::Error> {
        match self.poll_policy {
            PollPolicy::Lenient => {
                warn!("status flag {} did not clear, continuing", flag);
                Ok(())
            }
            PollPolicy::Strict => Err(Bme280Error::Timeout),
        }
    }
}

impl<B, D> Bme280<B, D> {
    /// True once calibration coefficients have been loaded by [`init`](Self::init) or
    /// [`read_calibration`](Self::read_calibration).
    pub fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// The loaded calibration, if any.
    pub fn calibration(&self) -> Option<&CalibrationData> {
        self.calibration.as_ref()
    }

    /// The settings last written successfully.
    pub fn settings(&self) -> &Configuration {
        &self.settings
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    pub fn set_poll_policy(&mut self, policy: PollPolicy) {
        self.poll_policy = policy;
    }

    /// Destroys the driver and hands back the bus and delay.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }
}

/// This enum should reflect the physical state of the SDO pin. This is used to determine the I2C address
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdoPinState {
    /// SDO is pulled high by connection to VDDIO
    High,
    /// SDO is pulled low by connection to GND
    Low,
}

impl From<SdoPinState> for SevenBitAddress {
    fn from(state: SdoPinState) -> SevenBitAddress {
        match state {
            SdoPinState::High => 0x77,
            SdoPinState::Low => 0x76,
        }
    }
}

/// What to do when a bounded status poll runs out of attempts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollPolicy {
    /// Log a warning and carry on with the operation.
    #[default]
    Lenient,
    /// Fail the operation with [`Bme280Error::Timeout`].
    Strict,
}

/// A delay provider that does not wait at all.
///
/// Status polls still run their full number of attempts, just back to back.
///
/// ```rust
/// # tokio_test::block_on(async {
/// use bme280_rs::NoDelay;
/// use embedded_hal_async::delay::DelayNs;
///
/// NoDelay.delay_ms(1000).await;
/// # });
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Holds a compensated temperature, pressure and humidity sample.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Degrees Celsius
    pub temperature: f32,
    /// Pascal
    pub pressure: f32,
    /// Relative humidity in percent, `0.0..=100.0`
    pub humidity: f32,
}

#[cfg(feature = "uom")]
impl Measurement {
    pub fn temperature_uom(&self) -> uom::si::f32::ThermodynamicTemperature {
        uom::si::thermodynamic_temperature::ThermodynamicTemperature::new::<uom::si::thermodynamic_temperature::degree_celsius>(self.temperature)
    }

    pub fn pressure_uom(&self) -> uom::si::f32::Pressure {
        uom::si::pressure::Pressure::new::<uom::si::pressure::pascal>(self.pressure)
    }

    pub fn humidity_uom(&self) -> uom::si::f32::Ratio {
        uom::si::ratio::Ratio::new::<uom::si::ratio::percent>(self.humidity)
    }
}
