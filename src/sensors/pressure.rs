//! Ratiometric pressure transducer driver.
//!
//! Reads the analog output through an ESP32-S3 ADC channel and normalizes
//! the 12-bit raw value to a percentage of full scale.
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
static SIM_PRESSURE_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_pressure_adc(raw: u16) {
    SIM_PRESSURE_ADC.store(raw, Ordering::Relaxed);
}

/// Full-scale raw value of the 12-bit ADC.
const ADC_FULL_SCALE: f32 = 4095.0;

#[derive(Debug, Clone, Copy)]
pub struct PressureReading {
    pub raw: u16,
    /// Percentage of full scale (0–100).
    pub percent: f32,
}

pub struct PressureSensor {
    _adc_gpio: i32,
}

impl PressureSensor {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    pub fn read(&mut self) -> PressureReading {
        let raw = self.read_adc();
        let percent = (f32::from(raw) / ADC_FULL_SCALE) * 100.0;
        log::debug!("pressure: raw={raw} percent={percent:.2}");
        PressureReading { raw, percent }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(pins::ADC1_CH_PRESSURE)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = pins::ADC1_CH_PRESSURE;
        SIM_PRESSURE_ADC.load(Ordering::Relaxed)
    }
}
