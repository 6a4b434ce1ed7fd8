//! In-memory mock device for adapter tests
//!
//! Serves canned pages keyed by path and records every form submission.
//! Submissions to the wireless action re-render the wireless page from the
//! submitted fields, so the mock behaves like a device that echoes whatever
//! it was last told.

use async_trait::async_trait;
use routerctl::error::{Error, Result};
use routerctl::Fetcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockDevice {
    pages: Mutex<HashMap<String, String>>,
    pub submissions: Mutex<Vec<(String, Vec<(String, String)>)>>,
    pub fetch_calls: AtomicUsize,
    /// When true, every fetch/submit reports an expired session.
    pub expired: std::sync::atomic::AtomicBool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
            expired: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn with_page(self, path: &str, html: impl Into<String>) -> Self {
        self.pages.lock().unwrap().insert(path.to_string(), html.into());
        self
    }

    pub fn set_page(&self, path: &str, html: impl Into<String>) {
        self.pages.lock().unwrap().insert(path.to_string(), html.into());
    }

    pub fn submitted(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn last_submission(&self) -> Option<(String, Vec<(String, String)>)> {
        self.submissions.lock().unwrap().last().cloned()
    }
}

pub fn field_of<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Render a wireless settings page from form state, the way the firmware
/// would after an Apply.
pub fn render_wireless(
    ssid: &str,
    channel: &str,
    enabled: &str,
    key: &str,
) -> String {
    let (chk1, chk0) = if enabled == "1" {
        ("checked", "")
    } else {
        ("", "checked")
    };
    format!(
        r#"
        <form action="/cgi-bin/wlan_basic.cgi" method="post">
            <input type="radio" name="wlanEnable" value="1" {chk1}>
            <input type="radio" name="wlanEnable" value="0" {chk0}>
            <input type="text" name="ssid" value="{ssid}">
            <select name="channel">
                <option value="0">Auto</option>
                <option value="{channel}" selected>{channel}</option>
            </select>
            <select name="authType">
                <option value="WPA2PSK" selected>WPA2-PSK</option>
            </select>
            <input type="password" name="wpaKey" value="{key}">
            <input type="radio" name="broadcastSsid" value="1" checked>
            <input type="hidden" name="regDomain" value="ETSI">
            <input type="hidden" name="wlanState" value="idle">
        </form>
        "#
    )
}

#[async_trait]
impl Fetcher for MockDevice {
    async fn fetch(&self, path: &str) -> Result<String> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.expired.load(Ordering::SeqCst) {
            return Err(Error::SessionExpired);
        }
        self.pages
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Transport(format!("no such page: {path}")))
    }

    async fn submit(&self, path: &str, fields: &[(String, String)]) -> Result<String> {
        if self.expired.load(Ordering::SeqCst) {
            return Err(Error::SessionExpired);
        }
        self.submissions
            .lock()
            .unwrap()
            .push((path.to_string(), fields.to_vec()));

        // Echo behavior: an Apply on the wireless form updates the page the
        // next read will see.
        if path == "cgi-bin/wlan_basic.cgi" {
            let ssid = field_of(fields, "ssid").unwrap_or("");
            let channel = field_of(fields, "channel").unwrap_or("0");
            let enabled = field_of(fields, "wlanEnable").unwrap_or("0");
            let key = field_of(fields, "wpaKey").unwrap_or("");
            self.set_page("wlan/basic.htm", render_wireless(ssid, channel, enabled, key));
        }

        Ok("<html>OK</html>".to_string())
    }
}
