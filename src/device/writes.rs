//! Write operations: read-merge-submit
//!
//! Every form is all-fields-required; omitting a field resets it to a
//! firmware default, not "leave unchanged". Each write therefore rehydrates
//! the complete field set from the current page, overlays the caller's
//! deltas, validates them, and posts everything back. Validation failures
//! come back as a failed `OperationResult` without touching the wire;
//! session expiry and transport failures propagate as errors so the caller
//! can re-authenticate or retry. A 2xx on the POST is reported as success
//! without read-back; the device's POST semantics are undocumented and a
//! confirming read is the caller's call to make.

use super::{field, flag_value, read_schema, read_slot_form, set_field, DeviceAdapter};
use crate::error::{Error, Result};
use crate::models::{
    DhcpUpdate, MacFilterUpdate, OperationResult, PortForwardUpdate, QosRuleUpdate,
    WirelessUpdate,
};
use crate::validate;

fn check_wireless(update: &WirelessUpdate) -> Result<()> {
    if let Some(ssid) = &update.ssid {
        validate::ssid(ssid)?;
    }
    if let Some(password) = &update.password {
        validate::wpa_passphrase(password)?;
    }
    if let Some(channel) = update.channel {
        validate::wifi_channel(channel)?;
    }
    Ok(())
}

fn check_mac_filter(update: &MacFilterUpdate) -> Result<()> {
    if let Some(mac) = &update.mac {
        validate::mac_address(mac)?;
    }
    Ok(())
}

fn check_port_forward(update: &PortForwardUpdate) -> Result<()> {
    if let Some(port) = update.external_port {
        validate::port(port)?;
    }
    if let Some(port) = update.internal_port {
        validate::port(port)?;
    }
    if let Some(ip) = &update.internal_ip {
        validate::ipv4(ip)?;
    }
    Ok(())
}

fn check_qos(update: &QosRuleUpdate) -> Result<()> {
    if let Some(priority) = update.priority {
        validate::qos_priority(priority)?;
    }
    if let Some(port) = update.port {
        validate::port(port)?;
    }
    Ok(())
}

fn check_dhcp(update: &DhcpUpdate) -> Result<()> {
    if let Some(ip) = &update.start_ip {
        validate::ipv4(ip)?;
    }
    if let Some(ip) = &update.end_ip {
        validate::ipv4(ip)?;
    }
    if let Some(lease) = update.lease_seconds {
        if lease <= 0 {
            return Err(Error::Validation(format!(
                "lease time must be positive, got {lease}"
            )));
        }
    }
    Ok(())
}

fn check_slot(slot: usize, slots: usize) -> Result<()> {
    if slot >= slots {
        return Err(Error::Validation(format!(
            "rule slot must be 0-{}, got {slot}",
            slots - 1
        )));
    }
    Ok(())
}

impl DeviceAdapter {
    pub async fn set_wireless(&self, update: &WirelessUpdate) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let schema = &self.profile.wireless;

        let html = self.fetcher.fetch(schema.page).await?;
        let mut fields = read_schema(&html, schema);

        if let Some(ssid) = &update.ssid {
            set_field(&mut fields, "ssid", ssid.clone());
        }
        if let Some(password) = &update.password {
            set_field(&mut fields, "wpaKey", password.clone());
        }
        if let Some(channel) = update.channel {
            set_field(&mut fields, "channel", channel.to_string());
        }
        if let Some(enabled) = update.enabled {
            set_field(&mut fields, "wlanEnable", flag_value(enabled));
        }

        if let Err(err) = check_wireless(update) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        tracing::info!("Submitting wireless settings (ssid: {})", field(&fields, "ssid"));
        self.fetcher.submit(schema.action, &fields).await?;
        Ok(OperationResult::ok("wireless settings updated"))
    }

    pub async fn set_mac_filter(
        &self,
        slot: usize,
        update: &MacFilterUpdate,
    ) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let form = &self.profile.mac_filter;

        if let Err(err) = check_slot(slot, form.slots).and_then(|_| check_mac_filter(update)) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        let html = self.fetcher.fetch(form.page).await?;
        let mut fields = read_slot_form(&html, form);

        if let Some(active) = update.active {
            set_field(&mut fields, &format!("mfActive{slot}"), flag_value(active));
        }
        if let Some(mac) = &update.mac {
            set_field(&mut fields, &format!("mfMac{slot}"), mac.clone());
        }

        self.fetcher.submit(form.action, &fields).await?;
        Ok(OperationResult::ok(format!("MAC filter slot {slot} updated")))
    }

    pub async fn set_port_forward(
        &self,
        slot: usize,
        update: &PortForwardUpdate,
    ) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let form = &self.profile.port_forward;

        if let Err(err) = check_slot(slot, form.slots).and_then(|_| check_port_forward(update)) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        let html = self.fetcher.fetch(form.page).await?;
        let mut fields = read_slot_form(&html, form);

        if let Some(active) = update.active {
            set_field(&mut fields, &format!("pfActive{slot}"), flag_value(active));
        }
        if let Some(name) = &update.name {
            set_field(&mut fields, &format!("pfName{slot}"), name.clone());
        }
        if let Some(protocol) = &update.protocol {
            set_field(&mut fields, &format!("pfProto{slot}"), protocol.clone());
        }
        if let Some(port) = update.external_port {
            set_field(&mut fields, &format!("pfExtPort{slot}"), port.to_string());
        }
        if let Some(port) = update.internal_port {
            set_field(&mut fields, &format!("pfIntPort{slot}"), port.to_string());
        }
        if let Some(ip) = &update.internal_ip {
            set_field(&mut fields, &format!("pfIp{slot}"), ip.clone());
        }

        self.fetcher.submit(form.action, &fields).await?;
        Ok(OperationResult::ok(format!(
            "port forwarding slot {slot} updated"
        )))
    }

    pub async fn set_qos_rule(
        &self,
        slot: usize,
        update: &QosRuleUpdate,
    ) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let form = &self.profile.qos;

        if let Err(err) = check_slot(slot, form.slots).and_then(|_| check_qos(update)) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        let html = self.fetcher.fetch(form.page).await?;
        let mut fields = read_slot_form(&html, form);

        if let Some(active) = update.active {
            set_field(&mut fields, &format!("qosActive{slot}"), flag_value(active));
        }
        if let Some(name) = &update.name {
            set_field(&mut fields, &format!("qosName{slot}"), name.clone());
        }
        if let Some(priority) = update.priority {
            set_field(&mut fields, &format!("qosPrio{slot}"), priority.to_string());
        }
        if let Some(protocol) = &update.protocol {
            set_field(&mut fields, &format!("qosProto{slot}"), protocol.clone());
        }
        if let Some(port) = update.port {
            set_field(&mut fields, &format!("qosPort{slot}"), port.to_string());
        }

        self.fetcher.submit(form.action, &fields).await?;
        Ok(OperationResult::ok(format!("QoS rule slot {slot} updated")))
    }

    pub async fn set_dhcp(&self, update: &DhcpUpdate) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let schema = &self.profile.dhcp;

        let html = self.fetcher.fetch(schema.page).await?;
        let mut fields = read_schema(&html, schema);

        if let Some(enabled) = update.enabled {
            set_field(&mut fields, "dhcpEnable", flag_value(enabled));
        }
        if let Some(ip) = &update.start_ip {
            set_field(&mut fields, "dhcpStartIp", ip.clone());
        }
        if let Some(ip) = &update.end_ip {
            set_field(&mut fields, "dhcpEndIp", ip.clone());
        }
        if let Some(lease) = update.lease_seconds {
            set_field(&mut fields, "dhcpLease", lease.to_string());
        }

        if let Err(err) = check_dhcp(update) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        self.fetcher.submit(schema.action, &fields).await?;
        Ok(OperationResult::ok("DHCP settings updated"))
    }

    pub async fn set_admin_password(&self, new_password: &str) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let schema = &self.profile.admin_password;

        if let Err(err) = validate::admin_password(new_password) {
            return Ok(OperationResult::failed(err.to_string()));
        }

        let html = self.fetcher.fetch(schema.page).await?;
        let mut fields = read_schema(&html, schema);
        set_field(&mut fields, "newPassword", new_password.to_string());
        set_field(&mut fields, "confirmPassword", new_password.to_string());

        self.fetcher.submit(schema.action, &fields).await?;
        Ok(OperationResult::ok(
            "admin password changed; existing sessions may be dropped",
        ))
    }

    /// Restarting takes the console down for a minute or two; the POST gets
    /// no meaningful response and none is awaited beyond the status line.
    pub async fn restart(&self) -> Result<OperationResult> {
        let _gate = self.gate.write().await;
        let fields = vec![("restart".to_string(), "1".to_string())];
        self.fetcher.submit(self.profile.restart_action, &fields).await?;
        Ok(OperationResult::ok("restart command sent"))
    }
}
