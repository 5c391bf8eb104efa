//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and both actuator drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`]. This is the only module in the
//! system that touches actual hardware. On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::alarm_led::AlarmLed;
use crate::drivers::buzzer::Buzzer;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    sensor_hub: SensorHub,
    led: AlarmLed,
    buzzer: Buzzer,
}

impl HardwareAdapter {
    pub fn new(sensor_hub: SensorHub, led: AlarmLed, buzzer: Buzzer) -> Self {
        Self {
            sensor_hub,
            led,
            buzzer,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn read_pressure_percent(&mut self) -> f32 {
        self.sensor_hub.pressure.read().percent
    }

    fn read_gas_percent(&mut self) -> f32 {
        self.sensor_hub.gas.read().percent
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for HardwareAdapter {
    fn set_alarm_led(&mut self, on: bool) {
        self.led.set(on);
    }

    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set(on);
    }
}
