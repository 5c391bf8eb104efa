//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable client id in the form `airguard-xxyyzz` (last 3 bytes
//! of the 6-byte MAC, lowercase hex). This id is:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - Used as the MQTT client id
//! - The scope prefix of every topic when `unique_topic` is enabled

use crate::app::session::ClientId;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the client id from the device-name prefix and the last 3 MAC
/// bytes. Format: `<prefix>-xxyyzz` (e.g., `airguard-efcafe`), truncated
/// to the fixed client-id capacity.
pub fn client_id(prefix: &str, mac: &MacAddress) -> ClientId {
    let mut id = ClientId::new();
    use core::fmt::Write;
    for ch in prefix.chars() {
        if id.push(ch).is_err() {
            break;
        }
    }
    let _ = write!(id, "-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(client_id("airguard", &mac).as_str(), "airguard-aabbcc");
    }

    #[test]
    fn sim_mac_deterministic() {
        assert_eq!(read_mac(), read_mac());
    }

    #[test]
    fn client_id_from_sim_mac() {
        let id = client_id("airguard", &read_mac());
        assert_eq!(id.as_str(), "airguard-efcafe");
    }
}
