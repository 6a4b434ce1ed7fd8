//! Device adapter: typed reads and writes over one router family's page set
//!
//! Reads fetch a page and run the extraction engine over its descriptors.
//! Writes follow read-merge-submit: the device's forms are all-fields-
//! required, so every field is rehydrated from the current page, the caller's
//! deltas are overlaid, and the complete set is posted back. A per-adapter
//! `RwLock` keeps a write's read-merge-submit window exclusive; concurrent
//! writes would otherwise silently revert each other's fields.

mod reads;
mod writes;

use crate::error::Result;
use crate::extract;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::profile::{FormField, FormSchema, FormSource, RouterProfile, SlotForm};
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One adapter per live session: the write gate lives on the adapter, so two
/// adapters built over the same session would not serialize their writes
/// against each other.
pub struct DeviceAdapter {
    fetcher: Arc<dyn Fetcher>,
    profile: &'static RouterProfile,
    gate: RwLock<()>,
}

impl DeviceAdapter {
    /// Bind an adapter to an already-authenticated session.
    pub fn for_session(session: Session, profile: &'static RouterProfile) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpFetcher::new(session)?), profile))
    }

    /// Like [`for_session`](Self::for_session), with transport budgets from
    /// the `[http]` config section instead of the built-in defaults.
    pub fn for_session_with_timeouts(
        session: Session,
        profile: &'static RouterProfile,
        timeout: Duration,
        connect: Duration,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HttpFetcher::with_timeouts(session, timeout, connect)?),
            profile,
        ))
    }

    /// Bind an adapter to any transport. Tests use this with a mock device.
    pub fn new(fetcher: Arc<dyn Fetcher>, profile: &'static RouterProfile) -> Self {
        Self {
            fetcher,
            profile,
            gate: RwLock::new(()),
        }
    }

    pub fn profile(&self) -> &'static RouterProfile {
        self.profile
    }
}

/// Rehydrate one form field from the current page markup.
fn read_source(html: &str, name: &str, source: FormSource) -> String {
    match source {
        FormSource::Input => extract::input_value(html, name).unwrap_or_default(),
        FormSource::SelectValue => extract::selected_option_value(html, name).unwrap_or_default(),
        FormSource::Checked => extract::checked_value(html, name).unwrap_or_default(),
        FormSource::Fixed(value) => value.to_string(),
    }
}

/// Read every field of a single-instance form, in schema order. Fields the
/// page does not carry are submitted empty rather than omitted, since
/// omission resets them to firmware defaults.
pub(crate) fn read_schema(html: &str, schema: &FormSchema) -> Vec<(String, String)> {
    schema
        .fields
        .iter()
        .map(|f| (f.name.to_string(), read_source(html, f.name, f.source)))
        .collect()
}

/// Read a slot form: global fields first, then every slot's fields. All
/// slots are carried even when only one is being changed.
pub(crate) fn read_slot_form(html: &str, form: &SlotForm) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = form
        .globals
        .iter()
        .map(|f| (f.name.to_string(), read_source(html, f.name, f.source)))
        .collect();

    for slot in 0..form.slots {
        for f in form.per_slot {
            let name = slot_field(f, slot);
            fields.push((name.clone(), read_source(html, &name, f.source)));
        }
    }
    fields
}

pub(crate) fn slot_field(field: &FormField, slot: usize) -> String {
    format!("{}{}", field.name, slot)
}

/// Overlay one delta onto the rehydrated field set.
pub(crate) fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: String) {
    match fields.iter_mut().find(|(n, _)| n == name) {
        Some(entry) => entry.1 = value,
        None => fields.push((name.to_string(), value)),
    }
}

pub(crate) fn field<'a>(fields: &'a [(String, String)], name: &str) -> &'a str {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// Form flag convention: checked radios/boxes carry "1".
pub(crate) fn flag(value: &str) -> bool {
    value == "1"
}

pub(crate) fn flag_value(on: bool) -> String {
    if on { "1" } else { "0" }.to_string()
}

/// Empty extractions become the sentinel so snapshots stay total.
pub(crate) fn or_unknown(value: String) -> String {
    if value.is_empty() {
        extract::UNKNOWN.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::default_profile;

    const WLAN_PAGE: &str = r#"
        <form action="/cgi-bin/wlan_basic.cgi" method="post">
            <input type="radio" name="wlanEnable" value="1" checked>
            <input type="radio" name="wlanEnable" value="0">
            <input type="text" name="ssid" value="Home">
            <select name="channel">
                <option value="0">Auto</option>
                <option value="6" selected>6</option>
            </select>
            <select name="authType">
                <option value="WPA2PSK" selected>WPA2-PSK</option>
            </select>
            <input type="password" name="wpaKey" value="hunter2hunter2">
            <input type="radio" name="broadcastSsid" value="1" checked>
            <input type="hidden" name="regDomain" value="ETSI">
            <input type="hidden" name="wlanState" value="idle">
        </form>
    "#;

    #[test]
    fn schema_rehydrates_every_field_in_order() {
        let schema = &default_profile().wireless;
        let fields = read_schema(WLAN_PAGE, schema);
        assert_eq!(fields.len(), schema.fields.len());
        assert_eq!(field(&fields, "ssid"), "Home");
        assert_eq!(field(&fields, "channel"), "6");
        assert_eq!(field(&fields, "wlanEnable"), "1");
        // housekeeping fields carried verbatim
        assert_eq!(field(&fields, "regDomain"), "ETSI");
        assert_eq!(field(&fields, "apply"), "Apply");
    }

    #[test]
    fn missing_fields_are_submitted_empty_not_omitted() {
        let schema = &default_profile().wireless;
        let fields = read_schema("<html></html>", schema);
        assert_eq!(fields.len(), schema.fields.len());
        assert_eq!(field(&fields, "ssid"), "");
    }

    #[test]
    fn overlay_replaces_existing_and_appends_new() {
        let mut fields = vec![("ssid".to_string(), "Home".to_string())];
        set_field(&mut fields, "ssid", "Guest".to_string());
        set_field(&mut fields, "extra", "1".to_string());
        assert_eq!(field(&fields, "ssid"), "Guest");
        assert_eq!(field(&fields, "extra"), "1");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn slot_form_reads_all_slots() {
        let form = &default_profile().mac_filter;
        let html = r#"
            <input type="radio" name="mfEnable" value="1" checked>
            <select name="mfMode"><option value="deny" selected>Deny listed</option></select>
            <input type="checkbox" name="mfActive0" value="1" checked>
            <input type="text" name="mfMac0" value="00:11:22:33:44:55">
        "#;
        let fields = read_slot_form(html, form);
        assert_eq!(field(&fields, "mfMac0"), "00:11:22:33:44:55");
        assert_eq!(field(&fields, "mfActive0"), "1");
        // slot 7 is absent from the page but still carried
        assert!(fields.iter().any(|(n, _)| n == "mfMac7"));
        assert_eq!(
            fields.len(),
            form.globals.len() + form.slots * form.per_slot.len()
        );
    }
}
