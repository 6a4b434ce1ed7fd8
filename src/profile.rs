//! Per-firmware-family page layouts
//!
//! Everything the adapter knows about a console layout lives here as data:
//! page paths, field descriptors, form schemas, script-array variable names
//! and tuple widths. A firmware revision that moves a value or renames an
//! array becomes a new profile, not new parsing code.

use crate::extract::{FieldDescriptor, RowSelector, Strategy};

/// How to rehydrate one form field from the current settings page.
#[derive(Debug, Clone, Copy)]
pub enum FormSource {
    /// `value` attribute of an `<input>`.
    Input,
    /// `value` attribute of the selected `<option>`.
    SelectValue,
    /// `value` of the checked radio/checkbox ("0" when unchecked).
    Checked,
    /// Not on the page; always submitted with this value.
    Fixed(&'static str),
}

/// One field of an all-fields-required form.
#[derive(Debug, Clone, Copy)]
pub struct FormField {
    pub name: &'static str,
    pub source: FormSource,
}

impl FormField {
    pub const fn new(name: &'static str, source: FormSource) -> Self {
        Self { name, source }
    }
}

/// A single-instance settings form.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub page: &'static str,
    pub action: &'static str,
    pub fields: &'static [FormField],
}

/// A form made of numbered rule slots (`<prefix><slot>` field names) plus a
/// handful of global fields. Every slot must be resubmitted on each write.
#[derive(Debug, Clone, Copy)]
pub struct SlotForm {
    pub page: &'static str,
    pub action: &'static str,
    pub slots: usize,
    pub globals: &'static [FormField],
    /// `name` here is the per-slot prefix; slot 3 of prefix "pfName" is the
    /// form field "pfName3".
    pub per_slot: &'static [FormField],
}

/// A page read via field descriptors.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorPage {
    pub page: &'static str,
    pub fields: &'static [FieldDescriptor],
}

/// A page carrying a fixed-width embedded script array.
#[derive(Debug, Clone, Copy)]
pub struct ScriptTable {
    pub page: &'static str,
    pub var: &'static str,
    pub width: usize,
}

/// Full console layout for one router family.
#[derive(Debug, Clone, Copy)]
pub struct RouterProfile {
    pub name: &'static str,
    pub device_info: DescriptorPage,
    pub wan: DescriptorPage,
    pub dsl: DescriptorPage,
    pub link_stats: DescriptorPage,
    pub arp_table: ScriptTable,
    pub dhcp_leases: ScriptTable,
    pub wireless: FormSchema,
    pub dhcp: FormSchema,
    pub firewall: FormSchema,
    pub ddns: FormSchema,
    pub admin_password: FormSchema,
    pub mac_filter: SlotForm,
    pub port_forward: SlotForm,
    pub qos: SlotForm,
    pub restart_action: &'static str,
}

/// Look up a profile by the name used in config files.
pub fn by_name(name: &str) -> Option<&'static RouterProfile> {
    match name {
        "adsl2-mk2" => Some(&ADSL2_MK2),
        _ => None,
    }
}

pub fn default_profile() -> &'static RouterProfile {
    &ADSL2_MK2
}

// ── adsl2-mk2 family ──
//
// WAN connections live in `var wanList`, one 7-tuple per PVC:
//   [service, status, ip, gateway, dns1, dns2, defaultRoute]
// DHCP leases in `var dhcpList`: [hostname, ip, mac, expires]
// ARP entries in `var arpList`: [ip, mac]

const WAN_ROW: RowSelector = RowSelector::CellEquals { column: 6, value: "1" };

static DEVICE_INFO_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("model", &[Strategy::LabeledCell { label: "Device Model" }]),
    FieldDescriptor::new(
        "firmware",
        &[
            Strategy::LabeledCell { label: "Firmware Version" },
            Strategy::InputValue { name: "fwVer" },
        ],
    ),
    FieldDescriptor::new(
        "hardware",
        &[Strategy::LabeledCell { label: "Hardware Version" }],
    ),
    FieldDescriptor::new("uptime", &[Strategy::LabeledCell { label: "System Up Time" }]),
    FieldDescriptor::new("mac", &[Strategy::LabeledCell { label: "MAC Address" }]),
    FieldDescriptor::new(
        "lan_ip",
        &[
            Strategy::LabeledCell { label: "IP Address" },
            Strategy::InputValue { name: "lanIp" },
        ],
    ),
];

static WAN_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new(
        "service",
        &[Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 0 }],
    ),
    FieldDescriptor::new(
        "status",
        &[
            Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 1 },
            Strategy::LabeledCell { label: "Connection Status" },
        ],
    ),
    FieldDescriptor::new(
        "ip",
        &[
            Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 2 },
            Strategy::LabeledCell { label: "WAN IP" },
        ],
    ),
    FieldDescriptor::new(
        "gateway",
        &[
            Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 3 },
            Strategy::LabeledCell { label: "Default Gateway" },
        ],
    ),
    FieldDescriptor::new(
        "primary_dns",
        &[
            Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 4 },
            Strategy::LabeledCell { label: "Primary DNS" },
        ],
    ),
    FieldDescriptor::new(
        "secondary_dns",
        &[
            Strategy::ScriptArray { var: "wanList", row: WAN_ROW, column: 5 },
            Strategy::LabeledCell { label: "Secondary DNS" },
        ],
    ),
];

static DSL_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("line_status", &[Strategy::LabeledCell { label: "Line State" }]),
    FieldDescriptor::new("modulation", &[Strategy::LabeledCell { label: "Modulation" }]),
    FieldDescriptor::numeric(
        "snr_down_db",
        &[Strategy::LabeledCell { label: "SNR Margin (Downstream)" }],
    ),
    FieldDescriptor::numeric(
        "snr_up_db",
        &[Strategy::LabeledCell { label: "SNR Margin (Upstream)" }],
    ),
    FieldDescriptor::numeric(
        "attenuation_down_db",
        &[Strategy::LabeledCell { label: "Line Attenuation (Downstream)" }],
    ),
    FieldDescriptor::numeric(
        "attenuation_up_db",
        &[Strategy::LabeledCell { label: "Line Attenuation (Upstream)" }],
    ),
    FieldDescriptor::numeric(
        "rate_down_kbps",
        &[Strategy::LabeledCell { label: "Current Rate (Downstream)" }],
    ),
    FieldDescriptor::numeric(
        "rate_up_kbps",
        &[Strategy::LabeledCell { label: "Current Rate (Upstream)" }],
    ),
    FieldDescriptor::numeric(
        "crc_errors_down",
        &[Strategy::LabeledCell { label: "CRC Errors (Downstream)" }],
    ),
    FieldDescriptor::numeric(
        "crc_errors_up",
        &[Strategy::LabeledCell { label: "CRC Errors (Upstream)" }],
    ),
];

static LINK_STATS_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("interface", &[Strategy::SelectedOption { name: "statsIf" }]),
    FieldDescriptor::numeric("rx_packets", &[Strategy::LabeledCell { label: "RX Packets" }]),
    FieldDescriptor::numeric("tx_packets", &[Strategy::LabeledCell { label: "TX Packets" }]),
    FieldDescriptor::numeric("rx_errors", &[Strategy::LabeledCell { label: "RX Errors" }]),
    FieldDescriptor::numeric("tx_errors", &[Strategy::LabeledCell { label: "TX Errors" }]),
    FieldDescriptor::numeric("rx_drops", &[Strategy::LabeledCell { label: "RX Drops" }]),
    FieldDescriptor::numeric("tx_drops", &[Strategy::LabeledCell { label: "TX Drops" }]),
];

static WIRELESS_FORM: &[FormField] = &[
    FormField::new("wlanEnable", FormSource::Checked),
    FormField::new("ssid", FormSource::Input),
    FormField::new("channel", FormSource::SelectValue),
    FormField::new("authType", FormSource::SelectValue),
    FormField::new("wpaKey", FormSource::Input),
    FormField::new("broadcastSsid", FormSource::Checked),
    // Housekeeping fields the form requires but the caller never sees.
    FormField::new("regDomain", FormSource::Input),
    FormField::new("wlanState", FormSource::Input),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static DHCP_FORM: &[FormField] = &[
    FormField::new("dhcpEnable", FormSource::Checked),
    FormField::new("dhcpStartIp", FormSource::Input),
    FormField::new("dhcpEndIp", FormSource::Input),
    FormField::new("dhcpLease", FormSource::Input),
    FormField::new("lanGateway", FormSource::Input),
    FormField::new("lanDns", FormSource::Input),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static FIREWALL_FORM: &[FormField] = &[
    FormField::new("fwEnable", FormSource::Checked),
    FormField::new("spiEnable", FormSource::Checked),
    FormField::new("dosEnable", FormSource::Checked),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static DDNS_FORM: &[FormField] = &[
    FormField::new("ddnsEnable", FormSource::Checked),
    FormField::new("ddnsProvider", FormSource::SelectValue),
    FormField::new("ddnsHostname", FormSource::Input),
    FormField::new("ddnsUsername", FormSource::Input),
    FormField::new("ddnsPassword", FormSource::Input),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static PASSWORD_FORM: &[FormField] = &[
    FormField::new("adminUser", FormSource::Input),
    FormField::new("newPassword", FormSource::Fixed("")),
    FormField::new("confirmPassword", FormSource::Fixed("")),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static MAC_FILTER_GLOBALS: &[FormField] = &[
    FormField::new("mfEnable", FormSource::Checked),
    FormField::new("mfMode", FormSource::SelectValue),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

static MAC_FILTER_SLOT: &[FormField] = &[
    FormField::new("mfActive", FormSource::Checked),
    FormField::new("mfMac", FormSource::Input),
];

static PORT_FORWARD_SLOT: &[FormField] = &[
    FormField::new("pfActive", FormSource::Checked),
    FormField::new("pfName", FormSource::Input),
    FormField::new("pfProto", FormSource::SelectValue),
    FormField::new("pfExtPort", FormSource::Input),
    FormField::new("pfIntPort", FormSource::Input),
    FormField::new("pfIp", FormSource::Input),
];

static PORT_FORWARD_GLOBALS: &[FormField] =
    &[FormField::new("apply", FormSource::Fixed("Apply"))];

static QOS_SLOT: &[FormField] = &[
    FormField::new("qosActive", FormSource::Checked),
    FormField::new("qosName", FormSource::Input),
    FormField::new("qosPrio", FormSource::SelectValue),
    FormField::new("qosProto", FormSource::SelectValue),
    FormField::new("qosPort", FormSource::Input),
];

static QOS_GLOBALS: &[FormField] = &[
    FormField::new("qosEnable", FormSource::Checked),
    FormField::new("apply", FormSource::Fixed("Apply")),
];

pub static ADSL2_MK2: RouterProfile = RouterProfile {
    name: "adsl2-mk2",
    device_info: DescriptorPage {
        page: "status/deviceinfo.htm",
        fields: DEVICE_INFO_FIELDS,
    },
    wan: DescriptorPage {
        page: "status/wan.htm",
        fields: WAN_FIELDS,
    },
    dsl: DescriptorPage {
        page: "status/dsl.htm",
        fields: DSL_FIELDS,
    },
    link_stats: DescriptorPage {
        page: "status/statistics.htm",
        fields: LINK_STATS_FIELDS,
    },
    arp_table: ScriptTable {
        page: "status/arp.htm",
        var: "arpList",
        width: 2,
    },
    dhcp_leases: ScriptTable {
        page: "lan/dhcpsetup.htm",
        var: "dhcpList",
        width: 4,
    },
    wireless: FormSchema {
        page: "wlan/basic.htm",
        action: "cgi-bin/wlan_basic.cgi",
        fields: WIRELESS_FORM,
    },
    dhcp: FormSchema {
        page: "lan/dhcpsetup.htm",
        action: "cgi-bin/dhcp_setup.cgi",
        fields: DHCP_FORM,
    },
    firewall: FormSchema {
        page: "security/firewall.htm",
        action: "cgi-bin/firewall.cgi",
        fields: FIREWALL_FORM,
    },
    ddns: FormSchema {
        page: "access/ddns.htm",
        action: "cgi-bin/ddns.cgi",
        fields: DDNS_FORM,
    },
    admin_password: FormSchema {
        page: "admin/password.htm",
        action: "cgi-bin/password.cgi",
        fields: PASSWORD_FORM,
    },
    mac_filter: SlotForm {
        page: "wlan/macfilter.htm",
        action: "cgi-bin/wlan_macfilter.cgi",
        slots: 8,
        globals: MAC_FILTER_GLOBALS,
        per_slot: MAC_FILTER_SLOT,
    },
    port_forward: SlotForm {
        page: "nat/virtualserver.htm",
        action: "cgi-bin/virtual_server.cgi",
        slots: 8,
        globals: PORT_FORWARD_GLOBALS,
        per_slot: PORT_FORWARD_SLOT,
    },
    qos: SlotForm {
        page: "qos/rules.htm",
        action: "cgi-bin/qos_rules.cgi",
        slots: 8,
        globals: QOS_GLOBALS,
        per_slot: QOS_SLOT,
    },
    restart_action: "cgi-bin/restart.cgi",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_resolve_by_name() {
        assert!(by_name("adsl2-mk2").is_some());
        assert!(by_name("no-such-family").is_none());
        assert_eq!(default_profile().name, "adsl2-mk2");
    }

    #[test]
    fn slot_forms_declare_at_least_one_slot() {
        let p = default_profile();
        for form in [&p.mac_filter, &p.port_forward, &p.qos] {
            assert!(form.slots > 0);
            assert!(!form.per_slot.is_empty());
        }
    }
}
