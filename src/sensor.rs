//! Unified sensor adapters.
//!
//! A BME280 measures three quantities at once. [`QuantitySensor`] exposes each of them as an
//! independent [`Sensor`] that produces [`SensorEvent`]s and describes itself through
//! [`SensorInfo`], so generic sensor-polling code does not need to know about the BME280.
//!
//! All adapters of one device share the driver through an [`embassy_sync::mutex::Mutex`]. Each
//! event holds the lock for one whole acquisition, so a forced-mode trigger, the status poll,
//! the data read and the compensation chain (which carries `t_fine` from temperature into
//! pressure and humidity) are never interleaved with another adapter's.
//!
//! # Examples
//! ```rust,no_run
//! # use bme280_rs::{Bme280, Bme280Result};
//! # use bme280_rs::bus::Bus;
//! # use embedded_hal_async::delay::DelayNs;
//! # async fn demo<B: Bus, D: DelayNs>(device: Bme280<B, D>) -> Bme280Result<(), B::Error> {
//! use bme280_rs::sensor::{HumiditySensor, PressureSensor, Sensor};
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use embassy_sync::mutex::Mutex;
//!
//! let device: Mutex<NoopRawMutex, _> = Mutex::new(device);
//! let mut pressure = PressureSensor::new(&device, 1);
//! let mut humidity = HumiditySensor::new(&device, 2);
//!
//! let event = pressure.event().await?;
//! println!("{} hPa", event.value);
//! # Ok(()) }
//! ```
use crate::bus::Bus;
use crate::{Bme280, Bme280Result, Measurement};
use core::marker::PhantomData;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_hal_async::delay::DelayNs;

pub const SENSOR_NAME_MAXLEN: usize = 32;

/// Sensor type identifiers, numbered like the Android / Adafruit unified sensor types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i32)]
pub enum SensorType {
    Pressure = 6,
    RelativeHumidity = 12,
    AmbientTemperature = 13,
}

impl From<SensorType> for i32 {
    fn from(t: SensorType) -> i32 {
        t as i32
    }
}

/// One reading of one quantity.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorEvent {
    /// Size of this struct in bytes
    pub version: i32,
    pub sensor_id: i32,
    pub sensor_type: SensorType,
    /// Milliseconds. Left at 0, callers with a clock fill it in.
    pub timestamp: u64,
    /// °C, hPa or %RH depending on `sensor_type`
    pub value: f32,
}

/// Static description of a sensor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorInfo {
    pub name: heapless::String<SENSOR_NAME_MAXLEN>,
    pub version: i32,
    pub sensor_id: i32,
    pub sensor_type: SensorType,
    pub max_value: f32,
    pub min_value: f32,
    pub resolution: f32,
    /// Minimum delay between events in microseconds, 0 if not rate limited
    pub min_delay: i32,
    /// Time to initialize in milliseconds
    pub init_delay: i32,
}

pub trait Sensor {
    type Error;

    /// Takes a fresh reading.
    fn event(&mut self) -> impl Future<Output = Result<SensorEvent, Self::Error>>;

    fn info(&self) -> SensorInfo;
}

/// One of the quantities a BME280 measures.
pub trait Quantity {
    const NAME: &'static str;
    const SENSOR_TYPE: SensorType;
    const MAX_VALUE: f32;
    const MIN_VALUE: f32;
    const RESOLUTION: f32;

    /// Picks this quantity out of a measurement, in the unit its events are reported in.
    fn value(measurement: &Measurement) -> f32;
}

pub struct Temperature;
pub struct Pressure;
pub struct Humidity;

impl Quantity for Temperature {
    const NAME: &'static str = "BME280 temperature";
    const SENSOR_TYPE: SensorType = SensorType::AmbientTemperature;
    const MAX_VALUE: f32 = 85.0;
    const MIN_VALUE: f32 = -40.0;
    const RESOLUTION: f32 = 0.01;

    fn value(measurement: &Measurement) -> f32 {
        measurement.temperature
    }
}

impl Quantity for Pressure {
    const NAME: &'static str = "BME280 pressure";
    const SENSOR_TYPE: SensorType = SensorType::Pressure;
    const MAX_VALUE: f32 = 1100.0;
    const MIN_VALUE: f32 = 300.0;
    const RESOLUTION: f32 = 0.16;

    fn value(measurement: &Measurement) -> f32 {
        // Pa -> hPa
        measurement.pressure / 100.0
    }
}

impl Quantity for Humidity {
    const NAME: &'static str = "BME280 humidity";
    const SENSOR_TYPE: SensorType = SensorType::RelativeHumidity;
    const MAX_VALUE: f32 = 100.0;
    const MIN_VALUE: f32 = 0.0;
    const RESOLUTION: f32 = 1.0;

    fn value(measurement: &Measurement) -> f32 {
        measurement.humidity
    }
}

/// Exposes one quantity of a shared [`Bme280`] as a [`Sensor`].
pub struct QuantitySensor<'a, M: RawMutex, B, D, Q> {
    device: &'a Mutex<M, Bme280<B, D>>,
    sensor_id: i32,
    _quantity: PhantomData<Q>,
}

pub type TemperatureSensor<'a, M, B, D> = QuantitySensor<'a, M, B, D, Temperature>;
pub type PressureSensor<'a, M, B, D> = QuantitySensor<'a, M, B, D, Pressure>;
pub type HumiditySensor<'a, M, B, D> = QuantitySensor<'a, M, B, D, Humidity>;

impl<'a, M: RawMutex, B, D, Q> QuantitySensor<'a, M, B, D, Q> {
    pub fn new(device: &'a Mutex<M, Bme280<B, D>>, sensor_id: i32) -> Self {
        Self {
            device,
            sensor_id,
            _quantity: PhantomData,
        }
    }

    pub fn sensor_id(&self) -> i32 {
        self.sensor_id
    }
}

impl<M, B, D, Q> Sensor for QuantitySensor<'_, M, B, D, Q>
where
    M: RawMutex,
    B: Bus,
    D: DelayNs,
    Q: Quantity,
{
    type Error = crate::error::Bme280Error<B::Error>;

    async fn event(&mut self) -> Bme280Result<SensorEvent, B::Error> {
        let measurement = {
            let mut device = self.device.lock().await;
            device.read_measurement().await?
        };

        Ok(SensorEvent {
            version: core::mem::size_of::<SensorEvent>() as i32,
            sensor_id: self.sensor_id,
            sensor_type: Q::SENSOR_TYPE,
            timestamp: 0,
            value: Q::value(&measurement),
        })
    }

    fn info(&self) -> SensorInfo {
        let mut name = heapless::String::new();
        // Every NAME fits in SENSOR_NAME_MAXLEN.
        let _ = name.push_str(Q::NAME);

        SensorInfo {
            name,
            version: 1,
            sensor_id: self.sensor_id,
            sensor_type: Q::SENSOR_TYPE,
            max_value: Q::MAX_VALUE,
            min_value: Q::MIN_VALUE,
            resolution: Q::RESOLUTION,
            min_delay: 0,
            init_delay: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Bme280Error;
    use crate::register::data::Data;
    use crate::register::Reg;
    use crate::testing::{FakeBus, FakeBusError, FakeDelay};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    async fn shared_device() -> Mutex<NoopRawMutex, Bme280<FakeBus, FakeDelay>> {
        let mut device = Bme280::new(FakeBus::bme280(), FakeDelay::default());
        device.init().await.unwrap();

        Mutex::new(device)
    }

    #[tokio::test]
    async fn adapters_report_their_quantity() {
        let device = shared_device().await;
        let mut temperature = TemperatureSensor::new(&device, 1);
        let mut pressure = PressureSensor::new(&device, 2);
        let mut humidity = HumiditySensor::new(&device, 3);

        let t = temperature.event().await.unwrap();
        assert_eq!(SensorType::AmbientTemperature, t.sensor_type);
        assert_eq!(1, t.sensor_id);
        assert_eq!(0, t.timestamp);
        assert!((t.value - 25.087421).abs() < 1e-4, "{}", t.value);

        let p = pressure.event().await.unwrap();
        assert_eq!(SensorType::Pressure, p.sensor_type);
        assert_eq!(2, p.sensor_id);
        assert!((p.value - 1006.5325).abs() < 1e-3, "{}", p.value);

        let h = humidity.event().await.unwrap();
        assert_eq!(SensorType::RelativeHumidity, h.sensor_type);
        assert_eq!(3, h.sensor_id);
        assert_eq!(56317.0 / 1024.0, h.value);
    }

    #[tokio::test]
    async fn adapters_describe_themselves() {
        let device = shared_device().await;

        let info = TemperatureSensor::new(&device, 7).info();
        assert_eq!("BME280 temperature", info.name.as_str());
        assert_eq!(7, info.sensor_id);
        assert_eq!(SensorType::AmbientTemperature, info.sensor_type);
        assert_eq!((85.0, -40.0, 0.01), (info.max_value, info.min_value, info.resolution));
        assert_eq!((1, 0, 2), (info.version, info.min_delay, info.init_delay));

        let info = PressureSensor::new(&device, 8).info();
        assert_eq!(SensorType::Pressure, info.sensor_type);
        assert_eq!((1100.0, 300.0, 0.16), (info.max_value, info.min_value, info.resolution));

        let info = HumiditySensor::new(&device, 9).info();
        assert_eq!(SensorType::RelativeHumidity, info.sensor_type);
        assert_eq!((100.0, 0.0, 1.0), (info.max_value, info.min_value, info.resolution));
    }

    #[test]
    fn sensor_type_ids() {
        assert_eq!(6, i32::from(SensorType::Pressure));
        assert_eq!(12, i32::from(SensorType::RelativeHumidity));
        assert_eq!(13, i32::from(SensorType::AmbientTemperature));
    }

    #[tokio::test]
    async fn bus_failure_is_reported() {
        let device = shared_device().await;
        device.lock().await.bus.fail_on(Data::ADDR);

        let mut humidity = HumiditySensor::new(&device, 1);
        assert_eq!(Err(Bme280Error::Bus(FakeBusError)), humidity.event().await);
    }
}
