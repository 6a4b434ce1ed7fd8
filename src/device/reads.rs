//! Read operations: fetch a page, extract, assemble a snapshot
//!
//! Snapshots are "as of this call"; nothing is cached. A field no strategy
//! can resolve comes back as the sentinel, never as an error, so one broken
//! label on a firmware revision does not take down the whole read.

use super::{field, flag, or_unknown, read_schema, read_slot_form, DeviceAdapter};
use crate::error::Result;
use crate::extract::{self, FieldDescriptor, UNKNOWN};
use crate::profile::ScriptTable;
use crate::models::{
    ArpEntry, ConnectedDevice, DdnsSettings, DeviceInfo, DhcpLease, DhcpSettings, DslStats,
    FirewallSettings, LinkStats, MacFilterEntry, PortForwardRule, QosRule, WanInfo,
    WirelessSettings,
};

fn extract_named(html: &str, fields: &[FieldDescriptor], name: &str) -> String {
    fields
        .iter()
        .find(|d| d.name == name)
        .map(|d| extract::extract(html, d))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn lease_from_row(row: &[String]) -> DhcpLease {
    DhcpLease {
        hostname: or_unknown(row.first().cloned().unwrap_or_default()),
        ip: or_unknown(row.get(1).cloned().unwrap_or_default()),
        mac: or_unknown(row.get(2).cloned().unwrap_or_default()),
        expires: or_unknown(row.get(3).cloned().unwrap_or_default()),
    }
}

fn arp_from_row(row: &[String]) -> ArpEntry {
    ArpEntry {
        ip: or_unknown(row.first().cloned().unwrap_or_default()),
        mac: or_unknown(row.get(1).cloned().unwrap_or_default()),
    }
}

/// Rows the firmware emits are fixed-width. Anything narrower is parser
/// noise (a stray bracket, a half-rendered row) and gets dropped; anything
/// wider is clipped to the declared width.
fn fixed_width_rows(html: &str, table: &ScriptTable) -> Vec<Vec<String>> {
    extract::script_array(html, table.var)
        .into_iter()
        .filter(|row| row.len() >= table.width)
        .map(|mut row| {
            row.truncate(table.width);
            row
        })
        .collect()
}

impl DeviceAdapter {
    pub async fn device_info(&self) -> Result<DeviceInfo> {
        let _gate = self.gate.read().await;
        let layout = &self.profile.device_info;
        let html = self.fetcher.fetch(layout.page).await?;
        Ok(DeviceInfo {
            model: extract_named(&html, layout.fields, "model"),
            firmware: extract_named(&html, layout.fields, "firmware"),
            hardware: extract_named(&html, layout.fields, "hardware"),
            uptime: extract_named(&html, layout.fields, "uptime"),
            mac: extract_named(&html, layout.fields, "mac"),
            lan_ip: extract_named(&html, layout.fields, "lan_ip"),
        })
    }

    pub async fn wan_info(&self) -> Result<WanInfo> {
        let _gate = self.gate.read().await;
        let layout = &self.profile.wan;
        let html = self.fetcher.fetch(layout.page).await?;
        Ok(WanInfo {
            service: extract_named(&html, layout.fields, "service"),
            status: extract_named(&html, layout.fields, "status"),
            ip: extract_named(&html, layout.fields, "ip"),
            gateway: extract_named(&html, layout.fields, "gateway"),
            primary_dns: extract_named(&html, layout.fields, "primary_dns"),
            secondary_dns: extract_named(&html, layout.fields, "secondary_dns"),
        })
    }

    pub async fn dsl_stats(&self) -> Result<DslStats> {
        let _gate = self.gate.read().await;
        let layout = &self.profile.dsl;
        let html = self.fetcher.fetch(layout.page).await?;
        let text = |name: &str| extract_named(&html, layout.fields, name);
        Ok(DslStats {
            line_status: text("line_status"),
            modulation: text("modulation"),
            snr_down_db: extract::parse_signed(&text("snr_down_db")),
            snr_up_db: extract::parse_signed(&text("snr_up_db")),
            attenuation_down_db: extract::parse_signed(&text("attenuation_down_db")),
            attenuation_up_db: extract::parse_signed(&text("attenuation_up_db")),
            rate_down_kbps: extract::parse_number(&text("rate_down_kbps")),
            rate_up_kbps: extract::parse_number(&text("rate_up_kbps")),
            crc_errors_down: extract::parse_number(&text("crc_errors_down")),
            crc_errors_up: extract::parse_number(&text("crc_errors_up")),
        })
    }

    pub async fn link_stats(&self) -> Result<LinkStats> {
        let _gate = self.gate.read().await;
        let layout = &self.profile.link_stats;
        let html = self.fetcher.fetch(layout.page).await?;
        let text = |name: &str| extract_named(&html, layout.fields, name);
        Ok(LinkStats {
            interface: text("interface"),
            rx_packets: extract::parse_number(&text("rx_packets")),
            tx_packets: extract::parse_number(&text("tx_packets")),
            rx_errors: extract::parse_number(&text("rx_errors")),
            tx_errors: extract::parse_number(&text("tx_errors")),
            rx_drops: extract::parse_number(&text("rx_drops")),
            tx_drops: extract::parse_number(&text("tx_drops")),
        })
    }

    pub async fn arp_table(&self) -> Result<Vec<ArpEntry>> {
        let _gate = self.gate.read().await;
        let table = &self.profile.arp_table;
        let html = self.fetcher.fetch(table.page).await?;
        Ok(fixed_width_rows(&html, table)
            .iter()
            .map(|row| arp_from_row(row))
            .collect())
    }

    pub async fn dhcp_leases(&self) -> Result<Vec<DhcpLease>> {
        let _gate = self.gate.read().await;
        let table = &self.profile.dhcp_leases;
        let html = self.fetcher.fetch(table.page).await?;
        Ok(fixed_width_rows(&html, table)
            .iter()
            .map(|row| lease_from_row(row))
            .collect())
    }

    /// ARP table joined with DHCP lease hostnames. The join key is the MAC
    /// address compared case-insensitively; ARP entries without a matching
    /// lease keep hostname "Unknown".
    pub async fn connected_devices(&self) -> Result<Vec<ConnectedDevice>> {
        let _gate = self.gate.read().await;

        let arp_html = self.fetcher.fetch(self.profile.arp_table.page).await?;
        let lease_html = self.fetcher.fetch(self.profile.dhcp_leases.page).await?;

        let leases: Vec<DhcpLease> = fixed_width_rows(&lease_html, &self.profile.dhcp_leases)
            .iter()
            .map(|row| lease_from_row(row))
            .collect();

        let devices = fixed_width_rows(&arp_html, &self.profile.arp_table)
            .iter()
            .map(|row| {
                let entry = arp_from_row(row);
                let hostname = leases
                    .iter()
                    .find(|l| l.mac.eq_ignore_ascii_case(&entry.mac))
                    .map(|l| l.hostname.clone())
                    .unwrap_or_else(|| UNKNOWN.to_string());
                ConnectedDevice {
                    hostname,
                    ip: entry.ip,
                    mac: entry.mac,
                }
            })
            .collect();

        Ok(devices)
    }

    pub async fn wireless_settings(&self) -> Result<WirelessSettings> {
        let _gate = self.gate.read().await;
        let schema = &self.profile.wireless;
        let html = self.fetcher.fetch(schema.page).await?;
        let fields = read_schema(&html, schema);
        Ok(WirelessSettings {
            enabled: flag(field(&fields, "wlanEnable")),
            ssid: or_unknown(field(&fields, "ssid").to_string()),
            channel: extract::parse_number(field(&fields, "channel")),
            security: or_unknown(field(&fields, "authType").to_string()),
            broadcast_ssid: flag(field(&fields, "broadcastSsid")),
        })
    }

    pub async fn dhcp_settings(&self) -> Result<DhcpSettings> {
        let _gate = self.gate.read().await;
        let schema = &self.profile.dhcp;
        let html = self.fetcher.fetch(schema.page).await?;
        let fields = read_schema(&html, schema);
        Ok(DhcpSettings {
            enabled: flag(field(&fields, "dhcpEnable")),
            start_ip: or_unknown(field(&fields, "dhcpStartIp").to_string()),
            end_ip: or_unknown(field(&fields, "dhcpEndIp").to_string()),
            lease_seconds: extract::parse_number(field(&fields, "dhcpLease")),
            gateway: or_unknown(field(&fields, "lanGateway").to_string()),
            dns: or_unknown(field(&fields, "lanDns").to_string()),
        })
    }

    pub async fn firewall_settings(&self) -> Result<FirewallSettings> {
        let _gate = self.gate.read().await;
        let schema = &self.profile.firewall;
        let html = self.fetcher.fetch(schema.page).await?;
        let fields = read_schema(&html, schema);
        Ok(FirewallSettings {
            enabled: flag(field(&fields, "fwEnable")),
            spi_enabled: flag(field(&fields, "spiEnable")),
            dos_protection: flag(field(&fields, "dosEnable")),
        })
    }

    pub async fn ddns_settings(&self) -> Result<DdnsSettings> {
        let _gate = self.gate.read().await;
        let schema = &self.profile.ddns;
        let html = self.fetcher.fetch(schema.page).await?;
        let fields = read_schema(&html, schema);
        Ok(DdnsSettings {
            enabled: flag(field(&fields, "ddnsEnable")),
            provider: or_unknown(field(&fields, "ddnsProvider").to_string()),
            hostname: or_unknown(field(&fields, "ddnsHostname").to_string()),
            username: or_unknown(field(&fields, "ddnsUsername").to_string()),
        })
    }

    /// Occupied MAC filter slots (slots with an empty MAC are free).
    pub async fn mac_filter_entries(&self) -> Result<Vec<MacFilterEntry>> {
        let _gate = self.gate.read().await;
        let form = &self.profile.mac_filter;
        let html = self.fetcher.fetch(form.page).await?;
        let fields = read_slot_form(&html, form);

        let mut entries = Vec::new();
        for slot in 0..form.slots {
            let mac = field(&fields, &format!("mfMac{slot}"));
            if mac.is_empty() {
                continue;
            }
            entries.push(MacFilterEntry {
                slot,
                active: flag(field(&fields, &format!("mfActive{slot}"))),
                mac: mac.to_string(),
            });
        }
        Ok(entries)
    }

    pub async fn port_forwards(&self) -> Result<Vec<PortForwardRule>> {
        let _gate = self.gate.read().await;
        let form = &self.profile.port_forward;
        let html = self.fetcher.fetch(form.page).await?;
        let fields = read_slot_form(&html, form);

        let mut rules = Vec::new();
        for slot in 0..form.slots {
            let name = field(&fields, &format!("pfName{slot}"));
            let ip = field(&fields, &format!("pfIp{slot}"));
            if name.is_empty() && ip.is_empty() {
                continue;
            }
            rules.push(PortForwardRule {
                slot,
                active: flag(field(&fields, &format!("pfActive{slot}"))),
                name: or_unknown(name.to_string()),
                protocol: or_unknown(field(&fields, &format!("pfProto{slot}")).to_string()),
                external_port: extract::parse_number(field(&fields, &format!("pfExtPort{slot}"))),
                internal_port: extract::parse_number(field(&fields, &format!("pfIntPort{slot}"))),
                internal_ip: or_unknown(ip.to_string()),
            });
        }
        Ok(rules)
    }

    pub async fn qos_rules(&self) -> Result<Vec<QosRule>> {
        let _gate = self.gate.read().await;
        let form = &self.profile.qos;
        let html = self.fetcher.fetch(form.page).await?;
        let fields = read_slot_form(&html, form);

        let mut rules = Vec::new();
        for slot in 0..form.slots {
            let name = field(&fields, &format!("qosName{slot}"));
            if name.is_empty() {
                continue;
            }
            rules.push(QosRule {
                slot,
                active: flag(field(&fields, &format!("qosActive{slot}"))),
                name: name.to_string(),
                priority: extract::parse_number(field(&fields, &format!("qosPrio{slot}"))),
                protocol: or_unknown(field(&fields, &format!("qosProto{slot}")).to_string()),
                port: extract::parse_number(field(&fields, &format!("qosPort{slot}"))),
            });
        }
        Ok(rules)
    }
}
