//! Authenticated page fetching against the device console
//!
//! One GET/POST pair behind the [`Fetcher`] trait so the device adapter can
//! be driven by a mock device in tests. No automatic retries here: retrying
//! belongs to the caller, and retrying an expired session would only hammer
//! the login page.

use crate::error::{Error, Result};
use crate::session::{self, Session, DESKTOP_USER_AGENT};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{redirect, Client, Response, StatusCode};
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport seam between the device adapter and the wire.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a console page, returning its raw markup.
    async fn fetch(&self, path: &str) -> Result<String>;

    /// POST a complete form field set, returning the response markup.
    async fn submit(&self, path: &str, fields: &[(String, String)]) -> Result<String>;
}

/// Real HTTP transport bound to one session's cookie set.
pub struct HttpFetcher {
    client: Client,
    session: Session,
}

impl HttpFetcher {
    pub fn new(session: Session) -> Result<Self> {
        Self::with_timeouts(session, FETCH_TIMEOUT, CONNECT_TIMEOUT)
    }

    /// Builds the transport with caller-supplied budgets, usually the
    /// `[http]` config section.
    pub fn with_timeouts(session: Session, timeout: Duration, connect: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,*/*"),
        );

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .connect_timeout(connect)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.session.base_url(),
            path.trim_start_matches('/')
        )
    }

    async fn read_body(&self, resp: Response) -> Result<String> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::SessionExpired);
        }
        if status.is_redirection() {
            if session::is_login_redirect(resp.headers()) {
                return Err(Error::SessionExpired);
            }
            return Err(Error::Transport(format!(
                "unexpected redirect ({status})"
            )));
        }
        if !status.is_success() {
            return Err(Error::Transport(format!("device returned {status}")));
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Cookie", self.session.cookie_header())
            .send()
            .await?;

        self.read_body(resp).await
    }

    async fn submit(&self, path: &str, fields: &[(String, String)]) -> Result<String> {
        let url = self.url(path);
        tracing::debug!("POST {} ({} fields)", url, fields.len());

        // Hand-encoded so field order matches the on-page form; some firmware
        // parses the body positionally.
        let body = encode_form(fields);

        let resp = self
            .client
            .post(&url)
            .header("Cookie", self.session.cookie_header())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        self.read_body(resp).await
    }
}

/// `application/x-www-form-urlencoded` body preserving field order.
pub fn encode_form(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_encoding_preserves_order_and_escapes() {
        let fields = vec![
            ("ssid".to_string(), "My Home".to_string()),
            ("wpaKey".to_string(), "p&ss=word".to_string()),
        ];
        assert_eq!(encode_form(&fields), "ssid=My%20Home&wpaKey=p%26ss%3Dword");
    }
}
