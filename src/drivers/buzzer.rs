//! Piezo buzzer driver.
//!
//! One LEDC PWM channel at 1 kHz. "On" means the configured duty (50 % by
//! default — a square wave the piezo turns into a tone); "off" is zero
//! duty. The intermittent beeping cadence lives in the agent, not here;
//! this driver is a dumb actuator.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the real LEDC channel via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct Buzzer {
    duty_percent: u8,
    sounding: bool,
}

impl Buzzer {
    pub fn new(duty_percent: u8) -> Self {
        Self {
            duty_percent: duty_percent.min(100),
            sounding: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        let duty = if on { self.duty_percent } else { 0 };
        self.set_duty_hw(duty);
        self.sounding = on;
    }

    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    fn set_duty_hw(&self, duty: u8) {
        let duty_8bit = ((u16::from(duty)) * 255 / 100) as u8;
        hw_init::ledc_set(hw_init::LEDC_CH_BUZZER, duty_8bit);
    }
}
