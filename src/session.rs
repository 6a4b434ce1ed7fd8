//! Session lifecycle: authenticate -> validate -> expire
//!
//! Legacy routers couple HTTP Basic auth with one or more session cookies set
//! during the first authenticated navigation. The full cookie set is kept and
//! replayed on every request, since CSRF/housekeeping cookies are sometimes
//! required alongside the session cookie proper.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, SET_COOKIE, USER_AGENT};
use reqwest::{redirect, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const AUTH_TIMEOUT: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0";

/// Login inputs. Ephemeral; never persisted beyond the authenticate call.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub username: String,
    pub password: String,
}

/// An authenticated, device-bound cookie set. Serializable so an external
/// store can persist it across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Device address, e.g. "192.168.1.1" or "192.168.1.1:8080".
    pub host: String,
    /// Value of the cookie that heuristically looks like the session id.
    pub session_id: String,
    /// Every cookie the device set, in arrival order.
    pub cookies: Vec<(String, String)>,
    /// Unix seconds, if any cookie carried a Max-Age.
    pub expires_hint: Option<u64>,
}

impl Session {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.host)
    }

    /// `Cookie:` header value; empty when the session has been invalidated.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Owns the authenticate/validate/invalidate state machine.
pub struct SessionManager {
    client: Client,
    probe_timeout: Duration,
}

impl SessionManager {
    pub fn new() -> Result<Self> {
        Self::with_timeouts(AUTH_TIMEOUT, PROBE_TIMEOUT, CONNECT_TIMEOUT)
    }

    /// Builds the manager with caller-supplied budgets, usually the `[http]`
    /// config section. The login flow gets `auth`, the liveness probe `probe`.
    pub fn with_timeouts(auth: Duration, probe: Duration, connect: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));

        // Redirects are classified, never followed: a login redirect is an
        // expiry signal, not a navigation.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(auth)
            .connect_timeout(connect)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            probe_timeout: probe,
        })
    }

    /// Drive the login flow: Basic challenge response on the root page, then
    /// one authenticated follow-up navigation if the device redirects, while
    /// capturing every cookie it sets along the way.
    pub async fn authenticate(&self, creds: &Credentials) -> Result<Session> {
        let base = format!("http://{}", creds.host);
        tracing::info!("Authenticating against {}", base);

        let resp = self
            .client
            .get(format!("{base}/"))
            .basic_auth(&creds.username, Some(&creds.password))
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Device at {} rejected credentials", creds.host);
            return Err(Error::InvalidCredentials);
        }

        let mut cookies = Vec::new();
        let mut expires_hint = None;
        collect_cookies(resp.headers(), &mut cookies, &mut expires_hint);

        // Some firmware only sets its session cookie on the post-login
        // landing page it redirects to.
        if status.is_redirection() {
            if let Some(target) = redirect_target(resp.headers(), &base) {
                let follow = self
                    .client
                    .get(&target)
                    .basic_auth(&creds.username, Some(&creds.password))
                    .header("Cookie", header_from(&cookies))
                    .send()
                    .await?;
                if follow.status() == StatusCode::UNAUTHORIZED {
                    return Err(Error::InvalidCredentials);
                }
                collect_cookies(follow.headers(), &mut cookies, &mut expires_hint);
            }
        } else if !status.is_success() {
            return Err(Error::Transport(format!(
                "login probe returned {status}"
            )));
        }

        let session_id = pick_session_cookie(&cookies);
        tracing::info!(
            "Authenticated; {} cookie(s) captured",
            cookies.len()
        );

        Ok(Session {
            host: creds.host.clone(),
            session_id,
            cookies,
            expires_hint,
        })
    }

    /// Advisory liveness probe against the device root page. Meant to be
    /// called before trusting a persisted session, not on every operation;
    /// probing per call would double request volume on an embedded device.
    pub async fn validate(&self, session: &Session) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/", session.base_url()))
            .header("Cookie", session.cookie_header())
            .timeout(self.probe_timeout)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        if status.is_redirection() && is_login_redirect(resp.headers()) {
            return Ok(false);
        }
        if status.is_success() {
            return Ok(true);
        }
        Err(Error::Transport(format!(
            "validation probe returned {status}"
        )))
    }

    /// Clears the cookie set. Idempotent.
    pub fn invalidate(&self, session: &mut Session) {
        session.cookies.clear();
        session.session_id.clear();
        session.expires_hint = None;
    }
}

fn collect_cookies(
    headers: &HeaderMap,
    cookies: &mut Vec<(String, String)>,
    expires_hint: &mut Option<u64>,
) {
    for value in headers.get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        let mut parts = raw.split(';');
        let Some(pair) = parts.next() else { continue };
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim().to_string();
        let value = value.trim().to_string();

        for attr in parts {
            if let Some(secs) = attr.trim().strip_prefix("Max-Age=") {
                if let Ok(secs) = secs.trim().parse::<u64>() {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0);
                    *expires_hint = Some(now + secs);
                }
            }
        }

        match cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => cookies.push((name, value)),
        }
    }
}

/// Prefer a cookie whose name looks like a session id; otherwise the first
/// cookie received stands in.
fn pick_session_cookie(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .find(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            lower.contains("session") || lower.contains("sid") || lower.contains("auth")
        })
        .or_else(|| cookies.first())
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

fn header_from(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(n, v)| format!("{n}={v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn redirect_target(headers: &HeaderMap, base: &str) -> Option<String> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    if location.starts_with("http") {
        Some(location.to_string())
    } else {
        Some(format!("{}/{}", base, location.trim_start_matches('/')))
    }
}

pub(crate) fn is_login_redirect(headers: &HeaderMap) -> bool {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(|loc| loc.to_ascii_lowercase().contains("login"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(cookies: Vec<(&str, &str)>) -> Session {
        Session {
            host: "192.168.1.1".into(),
            session_id: String::new(),
            cookies: cookies
                .into_iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            expires_hint: None,
        }
    }

    #[test]
    fn cookie_header_joins_in_order() {
        let s = session(vec![("SESSIONID", "abc"), ("csrf", "xyz")]);
        assert_eq!(s.cookie_header(), "SESSIONID=abc; csrf=xyz");
    }

    #[test]
    fn session_cookie_picked_by_name_heuristic() {
        let cookies = vec![
            ("housekeeping".to_string(), "1".to_string()),
            ("SESSIONID".to_string(), "abc".to_string()),
        ];
        assert_eq!(pick_session_cookie(&cookies), "abc");

        let no_match = vec![("first".to_string(), "f".to_string())];
        assert_eq!(pick_session_cookie(&no_match), "f");

        assert_eq!(pick_session_cookie(&[]), "");
    }

    #[tokio::test]
    async fn invalidate_is_idempotent() {
        let manager = SessionManager::new().unwrap();
        let mut s = session(vec![("SESSIONID", "abc")]);
        manager.invalidate(&mut s);
        assert!(s.cookies.is_empty());
        assert!(s.session_id.is_empty());
        manager.invalidate(&mut s);
        assert!(s.cookies.is_empty());
    }

    #[test]
    fn session_round_trips_through_serde() {
        let s = session(vec![("SESSIONID", "abc")]);
        let json = serde_json::to_string(&s).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
