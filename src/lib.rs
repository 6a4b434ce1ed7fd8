//! routerctl - control layer for legacy router admin consoles
//!
//! The only interface these devices offer is an undocumented HTML/JS admin
//! console. This crate turns that into typed operations: a session manager
//! that drives the login flow and keeps the cookie set alive, an extraction
//! engine that pulls values out of inconsistent markup and inline script
//! arrays, and a device adapter that reads snapshots and performs writes via
//! read-merge-submit so unspecified fields are never reset.

pub mod config;
pub mod device;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod profile;
pub mod session;
pub mod validate;

pub use device::DeviceAdapter;
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher};
pub use session::{Credentials, Session, SessionManager};
