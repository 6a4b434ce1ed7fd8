//! Typed snapshots and mutation requests for the device adapter
//!
//! Snapshots are immutable value objects: every field is either an extracted
//! value or the `Unknown` sentinel (numeric fields fall back to zero), never
//! absent. Mutation requests are all-`Option` partials; any field left `None`
//! keeps its current on-device value through the read-merge-submit protocol.

use serde::{Deserialize, Serialize};

/// Outcome of a write operation. No partial-success states: either the POST
/// went out or the operation failed before/during it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// ── Snapshots ──

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: String,
    pub firmware: String,
    pub hardware: String,
    pub uptime: String,
    pub mac: String,
    pub lan_ip: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WanInfo {
    pub service: String,
    pub status: String,
    pub ip: String,
    pub gateway: String,
    pub primary_dns: String,
    pub secondary_dns: String,
}

/// DSL line figures. dB values are signed; rates/counters are unsigned and
/// zero when the page omits them.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DslStats {
    pub line_status: String,
    pub modulation: String,
    pub snr_down_db: i64,
    pub snr_up_db: i64,
    pub attenuation_down_db: i64,
    pub attenuation_up_db: i64,
    pub rate_down_kbps: u64,
    pub rate_up_kbps: u64,
    pub crc_errors_down: u64,
    pub crc_errors_up: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LinkStats {
    pub interface: String,
    pub rx_packets: u64,
    pub tx_packets: u64,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_drops: u64,
    pub tx_drops: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WirelessSettings {
    pub enabled: bool,
    pub ssid: String,
    /// 0 means automatic channel selection.
    pub channel: u64,
    pub security: String,
    pub broadcast_ssid: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DhcpSettings {
    pub enabled: bool,
    pub start_ip: String,
    pub end_ip: String,
    pub lease_seconds: u64,
    pub gateway: String,
    pub dns: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DhcpLease {
    pub hostname: String,
    pub ip: String,
    pub mac: String,
    pub expires: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: String,
    pub mac: String,
}

/// ARP table joined with DHCP lease hostnames, keyed by MAC
/// (case-insensitive). ARP entries without a lease get hostname "Unknown".
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectedDevice {
    pub hostname: String,
    pub ip: String,
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MacFilterEntry {
    pub slot: usize,
    pub active: bool,
    pub mac: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PortForwardRule {
    pub slot: usize,
    pub active: bool,
    pub name: String,
    pub protocol: String,
    pub external_port: u64,
    pub internal_port: u64,
    pub internal_ip: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QosRule {
    pub slot: usize,
    pub active: bool,
    pub name: String,
    /// 0 (lowest) to 7 (highest).
    pub priority: u64,
    pub protocol: String,
    pub port: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FirewallSettings {
    pub enabled: bool,
    pub spi_enabled: bool,
    pub dos_protection: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DdnsSettings {
    pub enabled: bool,
    pub provider: String,
    pub hostname: String,
    pub username: String,
}

// ── Mutation requests ──

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirelessUpdate {
    pub ssid: Option<String>,
    pub password: Option<String>,
    /// 0..=14; 0 means automatic.
    pub channel: Option<i64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MacFilterUpdate {
    pub active: Option<bool>,
    pub mac: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortForwardUpdate {
    pub active: Option<bool>,
    pub name: Option<String>,
    pub protocol: Option<String>,
    pub external_port: Option<i64>,
    pub internal_port: Option<i64>,
    pub internal_ip: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QosRuleUpdate {
    pub active: Option<bool>,
    pub name: Option<String>,
    pub priority: Option<i64>,
    pub protocol: Option<String>,
    pub port: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DhcpUpdate {
    pub enabled: Option<bool>,
    pub start_ip: Option<String>,
    pub end_ip: Option<String>,
    pub lease_seconds: Option<i64>,
}
