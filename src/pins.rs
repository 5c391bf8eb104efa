//! GPIO / peripheral pin assignments for the AirGuard main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// Pressure transducer — ratiometric analog output, 0–100 % of full scale.
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const PRESSURE_ADC_GPIO: i32 = 5;
/// ADC1 channel for the pressure transducer.
pub const ADC1_CH_PRESSURE: u32 = 4;

/// MQ-2 combustible-gas sensor — analog voltage via resistive divider.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const GAS_ADC_GPIO: i32 = 9;
/// ADC1 channel for the gas sensor.
pub const ADC1_CH_GAS: u32 = 8;

// ---------------------------------------------------------------------------
// Alarm actuators
// ---------------------------------------------------------------------------

/// Digital output: alarm LED (active HIGH, no pull).
pub const ALARM_LED_GPIO: i32 = 13;

/// LEDC PWM output: piezo buzzer.
pub const BUZZER_PWM_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the buzzer tone (1 kHz — audible).
pub const BUZZER_PWM_FREQ_HZ: u32 = 1_000;
