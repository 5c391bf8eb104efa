//! Actuator drivers and hardware initialisation.

pub mod alarm_led;
pub mod buzzer;
pub mod hw_init;
