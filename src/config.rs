//! Configuration management
//!
//! Loads the router address, credentials, and profile selection from a TOML
//! file, falling back through the usual search paths. Credentials in the
//! file are only ever read at startup and handed to the session manager;
//! they are not kept around afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Target device
    #[serde(default)]
    pub router: RouterConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RouterConfig {
    /// Device address, host or host:port
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Console layout profile name
    #[serde(default = "default_profile_name")]
    pub profile: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: default_username(),
            password: String::new(),
            profile: default_profile_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Page fetch timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Login flow timeout in seconds (heavier than a page fetch)
    #[serde(default = "default_auth_timeout")]
    pub auth_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            auth_timeout: default_auth_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout)
    }

    pub fn auth_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.auth_timeout)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "192.168.1.1".to_string()
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_profile_name() -> String {
    "adsl2-mk2".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_auth_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, or use defaults if not found
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config_paths = Vec::new();
        if let Some(path) = explicit {
            config_paths.push(PathBuf::from(path));
        }
        config_paths.push(PathBuf::from("routerctl.toml"));
        config_paths.push(PathBuf::from("/etc/routerctl/config.toml"));
        if let Some(home) = dirs::home_dir() {
            config_paths.push(home.join(".config/routerctl/config.toml"));
        }

        for path in &config_paths {
            if path.exists() {
                tracing::debug!("Loading config from: {}", path.display());
                let contents =
                    std::fs::read_to_string(path).context("Failed to read config file")?;

                let config: Config =
                    toml::from_str(&contents).context("Failed to parse config file")?;

                return Ok(config);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [router]
            host = "10.0.0.138"
            password = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.router.host, "10.0.0.138");
        assert_eq!(cfg.router.username, "admin");
        assert_eq!(cfg.router.profile, "adsl2-mk2");
        assert_eq!(cfg.http.timeout, 10);
        assert_eq!(cfg.http.auth_timeout, 15);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn http_section_converts_to_durations() {
        let cfg: Config = toml::from_str(
            r#"
            [http]
            timeout = 3
            connect_timeout = 1
            auth_timeout = 7
            "#,
        )
        .unwrap();
        assert_eq!(cfg.http.fetch_timeout(), std::time::Duration::from_secs(3));
        assert_eq!(cfg.http.connect_timeout(), std::time::Duration::from_secs(1));
        assert_eq!(cfg.http.auth_timeout(), std::time::Duration::from_secs(7));
    }
}
