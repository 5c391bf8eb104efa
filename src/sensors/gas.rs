//! MQ-2 combustible-gas sensor driver.
//!
//! Reads the analog voltage output through an ESP32-S3 ADC channel, scales
//! the voltage to the sensor's concentration figure, and normalizes that to
//! a percentage of the 330-unit full scale.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: u16) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

const ADC_FULL_SCALE: f32 = 4095.0;
/// ADC reference voltage at 12 dB attenuation.
const ADC_REF_VOLTS: f32 = 3.3;
/// Concentration figure corresponding to 100 % of scale.
const GAS_FULL_SCALE: f32 = 330.0;

#[derive(Debug, Clone, Copy)]
pub struct GasReading {
    pub raw: u16,
    pub volts: f32,
    /// Percentage of full scale (0–100).
    pub percent: f32,
}

pub struct GasSensor {
    _adc_gpio: i32,
}

impl GasSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    pub fn read(&mut self) -> GasReading {
        let raw = self.read_adc();
        let volts = (f32::from(raw) / ADC_FULL_SCALE) * ADC_REF_VOLTS;
        let concentration = volts * 100.0;
        let percent = (concentration / GAS_FULL_SCALE) * 100.0;
        log::debug!("gas: raw={raw} volts={volts:.3} percent={percent:.2}");
        GasReading { raw, volts, percent }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::ADC1_CH_GAS)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = pins::ADC1_CH_GAS;
        SIM_GAS_ADC.load(Ordering::Relaxed)
    }
}
