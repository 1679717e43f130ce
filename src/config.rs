use crate::register::config::{IirFilter, StandbyTime};
use crate::register::ctrl_meas::{Oversampling, PowerMode};

/// Sampling settings of a BME280.
///
/// The driver keeps one of these as a mirror of what it last wrote successfully, see
/// [`Bme280::settings`](crate::Bme280::settings).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) humidity_oversampling: Oversampling,
    pub(crate) iir_filter: IirFilter,
    pub(crate) standby_time: StandbyTime,
    pub(crate) mode: PowerMode,
}

impl Default for Configuration {
    /// 1x oversampling on every channel, filter off, 1000 ms standby, sleep mode.
    fn default() -> Self {
        Self {
            temperature_oversampling: Oversampling::X1,
            pressure_oversampling: Oversampling::X1,
            humidity_oversampling: Oversampling::X1,
            iir_filter: IirFilter::Off,
            standby_time: StandbyTime::Ms1000,
            mode: PowerMode::Sleep,
        }
    }
}

impl Configuration {
    pub fn temperature_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.temperature_oversampling = oversampling;

        self
    }

    pub fn pressure_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.pressure_oversampling = oversampling;

        self
    }

    /// Sets the humidity oversampling. [`Oversampling::Skipped`] turns the humidity channel off.
    pub fn humidity_oversampling(mut self, oversampling: Oversampling) -> Self {
        self.humidity_oversampling = oversampling;

        self
    }

    pub fn iir_filter(mut self, filter: IirFilter) -> Self {
        self.iir_filter = filter;

        self
    }

    /// Sets the inactive period between conversions in [`PowerMode::Normal`].
    pub fn standby_time(mut self, standby: StandbyTime) -> Self {
        self.standby_time = standby;

        self
    }

    pub fn power_mode(mut self, mode: PowerMode) -> Self {
        self.mode = mode;

        self
    }

    pub fn get_temperature_oversampling(&self) -> Oversampling { self.temperature_oversampling }

    pub fn get_pressure_oversampling(&self) -> Oversampling { self.pressure_oversampling }

    pub fn get_humidity_oversampling(&self) -> Oversampling { self.humidity_oversampling }

    pub fn get_iir_filter(&self) -> IirFilter { self.iir_filter }

    pub fn get_standby_time(&self) -> StandbyTime { self.standby_time }

    pub fn get_power_mode(&self) -> PowerMode { self.mode }

    /// Returns the maximum duration of one conversion in microseconds.
    ///
    /// See datasheet section 9.1 "Measurement time". Skipped channels do not contribute.
    pub fn max_measurement_time_us(&self) -> u32 {
        let t = oversampling_factor(self.temperature_oversampling);
        let p = oversampling_factor(self.pressure_oversampling);
        let h = oversampling_factor(self.humidity_oversampling);

        let mut time = 1250 + 2300 * t;
        if p > 0 {
            time += 2300 * p + 575;
        }
        if h > 0 {
            time += 2300 * h + 575;
        }

        time
    }

    /// Recommended settings from datasheet section 3.5.
    pub fn from_preset(p: Preset) -> Self {
        match p {
            Preset::WeatherMonitoring => Configuration::default()
                .power_mode(PowerMode::Forced),
            Preset::HumiditySensing => Configuration::default()
                .power_mode(PowerMode::Forced)
                .pressure_oversampling(Oversampling::Skipped),
            Preset::IndoorNavigation => Configuration::default()
                .power_mode(PowerMode::Normal)
                .temperature_oversampling(Oversampling::X2)
                .pressure_oversampling(Oversampling::X16)
                .standby_time(StandbyTime::Ms0_5)
                .iir_filter(IirFilter::X16),
            Preset::Gaming => Configuration::default()
                .power_mode(PowerMode::Normal)
                .pressure_oversampling(Oversampling::X4)
                .humidity_oversampling(Oversampling::Skipped)
                .standby_time(StandbyTime::Ms0_5)
                .iir_filter(IirFilter::X16),
        }
    }
}

fn oversampling_factor(osr: Oversampling) -> u32 {
    match osr {
        Oversampling::Skipped => 0,
        Oversampling::X1 => 1,
        Oversampling::X2 => 2,
        Oversampling::X4 => 4,
        Oversampling::X8 => 8,
        Oversampling::X16 => 16,
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    /// One forced conversion per minute, 1x everywhere, filter off.
    WeatherMonitoring,
    /// Like weather monitoring but with pressure skipped.
    HumiditySensing,
    /// Continuous high resolution pressure with strong filtering.
    IndoorNavigation,
    /// Continuous pressure with humidity skipped.
    Gaming,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_power_on_settings() {
        let cfg = Configuration::default();
        assert_eq!(Oversampling::X1, cfg.get_temperature_oversampling());
        assert_eq!(Oversampling::X1, cfg.get_pressure_oversampling());
        assert_eq!(Oversampling::X1, cfg.get_humidity_oversampling());
        assert_eq!(IirFilter::Off, cfg.get_iir_filter());
        assert_eq!(StandbyTime::Ms1000, cfg.get_standby_time());
        assert_eq!(PowerMode::Sleep, cfg.get_power_mode());
    }

    #[test]
    fn max_measurement_time() {
        // 1.25 + 2.3 + 2.875 + 2.875 ms
        assert_eq!(9300, Configuration::default().max_measurement_time_us());
        // 1.25 + 4.6 + 37.375 + 2.875 ms
        assert_eq!(
            46100,
            Configuration::from_preset(Preset::IndoorNavigation).max_measurement_time_us()
        );
        // 1.25 + 2.3 + 2.875 ms
        assert_eq!(
            6425,
            Configuration::from_preset(Preset::HumiditySensing).max_measurement_time_us()
        );
    }
}
