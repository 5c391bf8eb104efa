//! System configuration parameters
//!
//! All tunable parameters for the AirGuard node. Values ship as compile-time
//! defaults mirroring the board bring-up constants; deployments can override
//! them with an embedded JSON blob or the `AIRGUARD_*` build-time variables.

use serde::{Deserialize, Serialize};

/// Bounded, heap-free string used for configuration values.
pub type ConfigString<const N: usize> = heapless::String<N>;

/// Copy `value` into a fixed-capacity string, truncating on overflow.
fn fixed<const N: usize>(value: &str) -> ConfigString<N> {
    let mut s = ConfigString::new();
    for ch in value.chars() {
        if s.push(ch).is_err() {
            break;
        }
    }
    s
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Network bootstrap ---
    /// WiFi station SSID.
    pub wifi_ssid: ConfigString<32>,
    /// WiFi station password (WPA2). Empty = open network.
    pub wifi_password: ConfigString<64>,

    // --- Broker session ---
    /// Broker URL, e.g. `mqtt://192.168.1.9:1883` (or `mqtts://` for TLS —
    /// transport encryption is handled opaquely by the session layer).
    pub broker_url: ConfigString<96>,
    /// Broker username (empty = anonymous).
    pub username: ConfigString<32>,
    /// Broker password.
    pub password: ConfigString<32>,
    /// Device-name prefix for the client id (`<device_name>-xxyyzz`).
    pub device_name: ConfigString<16>,
    /// When true, every topic is scoped as `/<client_id><name>`.
    pub unique_topic: bool,
    /// MQTT keep-alive interval (seconds).
    pub keep_alive_secs: u16,

    // --- Telemetry ---
    /// Sampling / publish cadence for both channels (seconds).
    pub telemetry_interval_secs: u32,
    /// Change gate: publish only when the reading moved more than this
    /// many percentage points since the last published value.
    pub publish_delta_percent: f32,

    // --- Alarm thresholds ---
    /// Pressure level (percent of full scale) that trips the alarm.
    pub pressure_alarm_percent: f32,
    /// Gas level (percent of full scale) that trips the alarm.
    /// Deliberately lower than the pressure threshold — gas is the more
    /// dangerous quantity on this board.
    pub gas_alarm_percent: f32,

    // --- Buzzer ---
    /// Buzzer on/off toggle interval while the alarm is active (ms).
    pub buzzer_interval_ms: u32,
    /// Buzzer PWM duty while sounding (0-100 %).
    pub buzzer_duty_percent: u8,

    // --- Run loop ---
    /// Upper bound on the idle wait between loop iterations (seconds).
    /// Purely a responsiveness ceiling, not a request timeout.
    pub idle_wait_ceiling_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Network bootstrap
            wifi_ssid: fixed(option_env!("AIRGUARD_WIFI_SSID").unwrap_or("")),
            wifi_password: fixed(option_env!("AIRGUARD_WIFI_PASSWORD").unwrap_or("")),

            // Broker session
            broker_url: fixed(option_env!("AIRGUARD_BROKER_URL").unwrap_or("mqtt://192.168.1.9:1883")),
            username: fixed(option_env!("AIRGUARD_USERNAME").unwrap_or("")),
            password: fixed(option_env!("AIRGUARD_PASSWORD").unwrap_or("")),
            device_name: fixed("airguard"),
            unique_topic: false,
            keep_alive_secs: 60,

            // Telemetry
            telemetry_interval_secs: 2,
            publish_delta_percent: 0.1,

            // Alarm thresholds
            pressure_alarm_percent: 60.0,
            gas_alarm_percent: 50.0,

            // Buzzer
            buzzer_interval_ms: 500,
            buzzer_duty_percent: 50,

            // Run loop
            idle_wait_ceiling_secs: 10,
        }
    }
}

impl SystemConfig {
    /// Parse an embedded JSON configuration blob.
    pub fn from_json(json: &str) -> Result<Self, crate::error::Error> {
        serde_json::from_str(json).map_err(|_| crate::error::Error::Config("invalid config JSON"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.telemetry_interval_secs > 0);
        assert!(c.publish_delta_percent > 0.0);
        assert!(c.pressure_alarm_percent > 0.0 && c.pressure_alarm_percent < 100.0);
        assert!(c.gas_alarm_percent > 0.0 && c.gas_alarm_percent < 100.0);
        assert!(c.buzzer_duty_percent <= 100);
        assert!(c.buzzer_interval_ms > 0);
        assert!(c.keep_alive_secs > 0);
    }

    #[test]
    fn thresholds_keep_source_asymmetry() {
        // Pressure trips at 60 %, gas at 50 % — the two channels deliberately
        // gate the shared alarm at different levels.
        let c = SystemConfig::default();
        assert!((c.pressure_alarm_percent - 60.0).abs() < f32::EPSILON);
        assert!((c.gas_alarm_percent - 50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2 = SystemConfig::from_json(&json).unwrap();
        assert_eq!(c.broker_url, c2.broker_url);
        assert_eq!(c.telemetry_interval_secs, c2.telemetry_interval_secs);
        assert!((c.publish_delta_percent - c2.publish_delta_percent).abs() < 0.001);
        assert_eq!(c.unique_topic, c2.unique_topic);
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let err = SystemConfig::from_json("not json").unwrap_err();
        assert_eq!(err, crate::error::Error::Config("invalid config JSON"));
    }

    #[test]
    fn overlong_strings_truncate() {
        let s: ConfigString<4> = fixed("abcdefgh");
        assert_eq!(s.as_str(), "abcd");
    }

    #[test]
    fn telemetry_faster_than_idle_ceiling() {
        let c = SystemConfig::default();
        assert!(
            c.telemetry_interval_secs < c.idle_wait_ceiling_secs,
            "cadence must be able to fire within one idle wait"
        );
    }
}
