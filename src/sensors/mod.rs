//! Sensor subsystem — individual channel drivers and the aggregating
//! [`SensorHub`].
//!
//! The hub owns both analog channels and hands out normalized percentage
//! readings to the hardware adapter.

pub mod gas;
pub mod pressure;

use gas::GasSensor;
use pressure::PressureSensor;

use crate::pins;

/// Aggregates both analog channels.
pub struct SensorHub {
    pub pressure: PressureSensor,
    pub gas: GasSensor,
}

impl SensorHub {
    /// Construct a new hub. Pass in pre-built drivers (built in main where
    /// peripheral ownership is established).
    pub fn new(pressure: PressureSensor, gas: GasSensor) -> Self {
        Self { pressure, gas }
    }

    /// Hub wired to the main-board pin assignment.
    pub fn on_board() -> Self {
        Self::new(
            PressureSensor::new(pins::PRESSURE_ADC_GPIO),
            GasSensor::new(pins::GAS_ADC_GPIO),
        )
    }
}
