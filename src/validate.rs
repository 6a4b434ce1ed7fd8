//! Field constraint checks run before any network write
//!
//! A bad value posted to a legacy router can disable the radio, break the
//! DHCP pool, or cut off management access entirely, so every write operation
//! validates its deltas locally and refuses to touch the wire on failure.

use crate::error::{Error, Result};
use regex::Regex;

pub fn ssid(value: &str) -> Result<()> {
    if value.is_empty() || value.len() > 32 {
        return Err(Error::Validation(format!(
            "SSID must be 1-32 characters, got {}",
            value.len()
        )));
    }
    Ok(())
}

pub fn wpa_passphrase(value: &str) -> Result<()> {
    if value.len() < 8 || value.len() > 63 {
        return Err(Error::Validation(format!(
            "WiFi password must be 8-63 characters, got {}",
            value.len()
        )));
    }
    Ok(())
}

/// 0 means automatic channel selection.
pub fn wifi_channel(value: i64) -> Result<()> {
    if !(0..=14).contains(&value) {
        return Err(Error::Validation(format!(
            "WiFi channel must be 0-14 (0 = auto), got {value}"
        )));
    }
    Ok(())
}

pub fn mac_address(value: &str) -> Result<()> {
    let re = Regex::new(r"^[0-9A-Fa-f]{2}(:[0-9A-Fa-f]{2}){5}$")
        .map_err(|e| Error::Validation(e.to_string()))?;
    if !re.is_match(value) {
        return Err(Error::Validation(format!(
            "MAC address must look like XX:XX:XX:XX:XX:XX, got '{value}'"
        )));
    }
    Ok(())
}

pub fn ipv4(value: &str) -> Result<()> {
    let octets: Vec<&str> = value.split('.').collect();
    let valid = octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.parse::<u8>().is_ok());
    if !valid {
        return Err(Error::Validation(format!(
            "'{value}' is not a valid IPv4 address"
        )));
    }
    Ok(())
}

pub fn port(value: i64) -> Result<()> {
    if !(1..=65535).contains(&value) {
        return Err(Error::Validation(format!(
            "port must be 1-65535, got {value}"
        )));
    }
    Ok(())
}

pub fn qos_priority(value: i64) -> Result<()> {
    if !(0..=7).contains(&value) {
        return Err(Error::Validation(format!(
            "QoS priority must be 0-7, got {value}"
        )));
    }
    Ok(())
}

pub fn admin_password(value: &str) -> Result<()> {
    if value.len() < 5 || value.len() > 15 {
        return Err(Error::Validation(format!(
            "admin password must be 5-15 characters, got {}",
            value.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssid_boundaries() {
        assert!(ssid("").is_err());
        assert!(ssid("a").is_ok());
        assert!(ssid(&"a".repeat(32)).is_ok());
        assert!(ssid(&"a".repeat(33)).is_err());
    }

    #[test]
    fn passphrase_boundaries() {
        assert!(wpa_passphrase(&"a".repeat(7)).is_err());
        assert!(wpa_passphrase(&"a".repeat(8)).is_ok());
        assert!(wpa_passphrase(&"a".repeat(63)).is_ok());
        assert!(wpa_passphrase(&"a".repeat(64)).is_err());
    }

    #[test]
    fn channel_boundaries() {
        assert!(wifi_channel(-1).is_err());
        assert!(wifi_channel(0).is_ok());
        assert!(wifi_channel(14).is_ok());
        assert!(wifi_channel(15).is_err());
    }

    #[test]
    fn priority_boundaries() {
        assert!(qos_priority(-1).is_err());
        assert!(qos_priority(0).is_ok());
        assert!(qos_priority(7).is_ok());
        assert!(qos_priority(8).is_err());
    }

    #[test]
    fn port_boundaries() {
        assert!(port(0).is_err());
        assert!(port(1).is_ok());
        assert!(port(65535).is_ok());
        assert!(port(65536).is_err());
    }

    #[test]
    fn mac_shape() {
        assert!(mac_address("00:1D:0F:11:22:33").is_ok());
        assert!(mac_address("00:1d:0f:11:22:33").is_ok());
        assert!(mac_address("00-1D-0F-11-22-33").is_err());
        assert!(mac_address("001D0F112233").is_err());
        assert!(mac_address("ZZ:1D:0F:11:22:33").is_err());
    }

    #[test]
    fn ipv4_shape() {
        assert!(ipv4("192.168.1.1").is_ok());
        assert!(ipv4("255.255.255.255").is_ok());
        assert!(ipv4("256.1.1.1").is_err());
        assert!(ipv4("192.168.1").is_err());
        assert!(ipv4("192.168.1.1.1").is_err());
        assert!(ipv4("not.an.ip.addr").is_err());
    }

    #[test]
    fn validation_message_is_human_readable() {
        let err = wifi_channel(15).unwrap_err();
        assert!(err.to_string().contains("0-14"));
    }
}
