//! Session manager and fetcher behavior against a live mock router
//!
//! Spins up a local axum server that mimics the device: HTTP Basic on the
//! root page, cookies set on login, 401/redirect behavior for stale
//! sessions.

use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use routerctl::{Credentials, Error, Fetcher, HttpFetcher, Session, SessionManager};
use std::net::SocketAddr;
use std::time::Duration;

const GOOD_AUTH: &str = "Basic YWRtaW46c2VjcmV0"; // admin:secret
const SESSION_COOKIE: &str = "SESSIONID=abc123";

fn has_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|c| c.contains(SESSION_COOKIE))
        .unwrap_or(false)
}

async fn root(headers: HeaderMap) -> Response {
    if has_session_cookie(&headers) {
        return (StatusCode::OK, "<html>index</html>").into_response();
    }
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(auth) if auth == GOOD_AUTH => (
            StatusCode::OK,
            AppendHeaders([
                (SET_COOKIE, "HOUSEKEEPING=1; Path=/"),
                (SET_COOKIE, "SESSIONID=abc123; Path=/; Max-Age=3600"),
            ]),
            "<html>index</html>",
        )
            .into_response(),
        _ => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    }
}

async fn device_info(headers: HeaderMap) -> Response {
    if !has_session_cookie(&headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    (
        StatusCode::OK,
        "<table><tr><td>Device Model</td><td>AR-2440 v2</td></tr></table>",
    )
        .into_response()
}

async fn redirect_login() -> Response {
    (
        StatusCode::FOUND,
        AppendHeaders([(axum::http::header::LOCATION, "/login.htm")]),
    )
        .into_response()
}

async fn redirect_other() -> Response {
    (
        StatusCode::FOUND,
        AppendHeaders([(axum::http::header::LOCATION, "/index.htm")]),
    )
        .into_response()
}

async fn echo(headers: HeaderMap, body: String) -> Response {
    let cookie = headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    (StatusCode::OK, format!("cookie:{cookie}\nbody:{body}")).into_response()
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/", get(root))
        .route("/status/deviceinfo.htm", get(device_info))
        .route("/expired", get(|| async { StatusCode::UNAUTHORIZED }))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
        .route("/redirect-login", get(redirect_login))
        .route("/redirect-other", get(redirect_other))
        .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                StatusCode::OK
            }),
        )
        .route("/cgi-bin/echo.cgi", post(echo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn credentials(addr: SocketAddr, password: &str) -> Credentials {
    Credentials {
        host: addr.to_string(),
        username: "admin".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn authenticate_captures_the_full_cookie_set() {
    let addr = serve().await;
    let manager = SessionManager::new().unwrap();

    let session = manager.authenticate(&credentials(addr, "secret")).await.unwrap();
    assert_eq!(session.session_id, "abc123");
    assert_eq!(session.cookies.len(), 2);
    assert!(session
        .cookies
        .iter()
        .any(|(n, v)| n == "HOUSEKEEPING" && v == "1"));
    assert!(session.expires_hint.is_some());
}

#[tokio::test]
async fn bad_credentials_are_reported_as_invalid() {
    let addr = serve().await;
    let manager = SessionManager::new().unwrap();

    let err = manager
        .authenticate(&credentials(addr, "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn validate_distinguishes_live_and_stale_sessions() {
    let addr = serve().await;
    let manager = SessionManager::new().unwrap();

    let mut session = manager.authenticate(&credentials(addr, "secret")).await.unwrap();
    assert!(manager.validate(&session).await.unwrap());

    // a stale cookie set no longer passes the probe
    session.cookies = vec![("SESSIONID".to_string(), "stale".to_string())];
    assert!(!manager.validate(&session).await.unwrap());

    manager.invalidate(&mut session);
    assert!(session.cookies.is_empty());
}

fn session_for(addr: SocketAddr, cookies: Vec<(&str, &str)>) -> Session {
    Session {
        host: addr.to_string(),
        session_id: String::new(),
        cookies: cookies
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect(),
        expires_hint: None,
    }
}

#[tokio::test]
async fn fetch_classifies_expiry_and_transport_failures() {
    let addr = serve().await;
    let fetcher = HttpFetcher::new(session_for(addr, vec![("SESSIONID", "abc123")])).unwrap();

    let html = fetcher.fetch("status/deviceinfo.htm").await.unwrap();
    assert!(html.contains("AR-2440 v2"));

    assert!(matches!(
        fetcher.fetch("expired").await.unwrap_err(),
        Error::SessionExpired
    ));
    assert!(matches!(
        fetcher.fetch("forbidden").await.unwrap_err(),
        Error::SessionExpired
    ));
    assert!(matches!(
        fetcher.fetch("redirect-login").await.unwrap_err(),
        Error::SessionExpired
    ));
    assert!(matches!(
        fetcher.fetch("redirect-other").await.unwrap_err(),
        Error::Transport(_)
    ));
    assert!(matches!(
        fetcher.fetch("boom").await.unwrap_err(),
        Error::Transport(_)
    ));
}

#[tokio::test]
async fn stale_cookies_fail_a_protected_page() {
    let addr = serve().await;
    let fetcher = HttpFetcher::new(session_for(addr, vec![("SESSIONID", "stale")])).unwrap();

    let err = fetcher.fetch("status/deviceinfo.htm").await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(err.to_string().contains("session expired"));
}

#[tokio::test]
async fn submit_sends_ordered_form_body_with_cookies() {
    let addr = serve().await;
    let fetcher = HttpFetcher::new(session_for(
        addr,
        vec![("SESSIONID", "abc123"), ("HOUSEKEEPING", "1")],
    ))
    .unwrap();

    let fields = vec![
        ("ssid".to_string(), "My Home".to_string()),
        ("channel".to_string(), "6".to_string()),
    ];
    let body = fetcher.submit("cgi-bin/echo.cgi", &fields).await.unwrap();

    assert!(body.contains("cookie:SESSIONID=abc123; HOUSEKEEPING=1"));
    assert!(body.contains("body:ssid=My%20Home&channel=6"));
}

#[tokio::test]
async fn configured_fetch_timeout_is_enforced() {
    let addr = serve().await;
    let fetcher = HttpFetcher::with_timeouts(
        session_for(addr, vec![("SESSIONID", "abc123")]),
        Duration::from_millis(200),
        Duration::from_secs(1),
    )
    .unwrap();

    let err = fetcher.fetch("slow").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn configured_auth_timeout_is_enforced() {
    let manager = SessionManager::with_timeouts(
        Duration::from_millis(200),
        Duration::from_millis(200),
        Duration::from_millis(200),
    )
    .unwrap();

    // a reserved TEST-NET address that never answers
    let err = manager
        .authenticate(&Credentials {
            host: "192.0.2.1".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // nothing listens on this port
    let fetcher = HttpFetcher::new(Session {
        host: "127.0.0.1:9".to_string(),
        session_id: String::new(),
        cookies: Vec::new(),
        expires_hint: None,
    })
    .unwrap();

    let err = fetcher.fetch("status/wan.htm").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
