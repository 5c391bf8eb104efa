//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements           | Connects to                |
//! |-------------|----------------------|----------------------------|
//! | `hardware`  | SensorPort           | ESP32 ADC                  |
//! |             | ActuatorPort         | ESP32 GPIO, LEDC PWM       |
//! | `log_sink`  | EventSink            | Serial log output          |
//! | `mqtt`      | SessionPort          | ESP-IDF MQTT client        |
//! | `time`      | (monotonic clock)    | ESP32 system timer         |
//! | `wifi`      | (network bootstrap)  | ESP-IDF WiFi STA           |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod time;

#[cfg(target_os = "espidf")]
pub mod mqtt;
#[cfg(target_os = "espidf")]
pub mod wifi;
