//! WiFi station bootstrap (ESP-IDF only).
//!
//! Brings the STA interface up synchronously before the broker session is
//! created. Connectivity loss after boot surfaces indirectly as a broker
//! `Disconnected` event; there is no reconnect layer here.

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::info;

use crate::config::SystemConfig;
use crate::error::Error;

/// Owns the WiFi driver for the lifetime of the process. Dropping it tears
/// the interface down, so `main` keeps it alive alongside the session.
pub struct WifiLink {
    _wifi: BlockingWifi<EspWifi<'static>>,
}

impl WifiLink {
    /// Configure STA mode from `config` and block until the netif is up.
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &SystemConfig,
    ) -> Result<Self, Error> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
            .map_err(|_| Error::Init("WiFi driver init failed"))?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)
            .map_err(|_| Error::Init("WiFi event wrapper init failed"))?;

        let auth_method = if config.wifi_password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| Error::Init("WiFi configuration rejected"))?;

        info!("WiFi: connecting to '{}'", config.wifi_ssid);
        wifi.start().map_err(|_| Error::Init("WiFi start failed"))?;
        wifi.connect()
            .map_err(|_| Error::Init("WiFi connect failed"))?;
        wifi.wait_netif_up()
            .map_err(|_| Error::Init("WiFi DHCP wait failed"))?;

        if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: up, ip={}", ip_info.ip);
        }

        Ok(Self { _wifi: wifi })
    }
}
