//! routerctl - command line front end for the control layer
//!
//! Authenticates against the device from config, then runs one adapter
//! operation and prints the result as JSON so calling layers (or a human
//! with a pipe to jq) can consume it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use routerctl::config::Config;
use routerctl::models::{
    DhcpUpdate, MacFilterUpdate, OperationResult, PortForwardUpdate, QosRuleUpdate,
    WirelessUpdate,
};
use routerctl::{profile, Credentials, DeviceAdapter, SessionManager};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "routerctl")]
#[command(about = "Legacy router console client", long_about = None)]
struct Args {
    /// Config file path (default: routerctl.toml)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Device model, firmware, uptime
    Status,
    /// WAN connection details
    Wan,
    /// DSL line figures
    Dsl,
    /// Interface packet counters
    Stats,
    /// Raw ARP table
    Arp,
    /// DHCP lease table
    Leases,
    /// Connected devices (ARP joined with lease hostnames)
    Clients,
    /// Wireless settings
    Wireless,
    /// DHCP server settings
    Dhcp,
    /// Port forwarding rules
    Forwards,
    /// QoS rules
    Qos,
    /// Firewall settings
    Firewall,
    /// Dynamic DNS settings
    Ddns,
    /// Change wireless settings; unspecified fields keep their values
    SetWifi {
        #[arg(long)]
        ssid: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        channel: Option<i64>,
        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Change DHCP server settings
    SetDhcp {
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        start_ip: Option<String>,
        #[arg(long)]
        end_ip: Option<String>,
        #[arg(long)]
        lease_seconds: Option<i64>,
    },
    /// Update one MAC filter slot
    FilterSet {
        #[arg(long)]
        slot: usize,
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Update one port forwarding slot
    ForwardSet {
        #[arg(long)]
        slot: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        protocol: Option<String>,
        #[arg(long)]
        external_port: Option<i64>,
        #[arg(long)]
        internal_port: Option<i64>,
        #[arg(long)]
        internal_ip: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Update one QoS rule slot
    QosSet {
        #[arg(long)]
        slot: usize,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
        #[arg(long)]
        protocol: Option<String>,
        #[arg(long)]
        port: Option<i64>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Change the admin password
    SetPassword {
        new_password: String,
    },
    /// Reboot the device (requires --yes)
    Restart {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = Config::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level)),
        )
        .init();

    let profile = profile::by_name(&cfg.router.profile)
        .with_context(|| format!("unknown router profile '{}'", cfg.router.profile))?;

    let manager = SessionManager::with_timeouts(
        cfg.http.auth_timeout(),
        cfg.http.fetch_timeout(),
        cfg.http.connect_timeout(),
    )?;
    let session = manager
        .authenticate(&Credentials {
            host: cfg.router.host.clone(),
            username: cfg.router.username.clone(),
            password: cfg.router.password.clone(),
        })
        .await
        .context("login failed")?;

    let adapter = DeviceAdapter::for_session_with_timeouts(
        session,
        profile,
        cfg.http.fetch_timeout(),
        cfg.http.connect_timeout(),
    )?;

    match args.command {
        Command::Status => print_json(&adapter.device_info().await?),
        Command::Wan => print_json(&adapter.wan_info().await?),
        Command::Dsl => print_json(&adapter.dsl_stats().await?),
        Command::Stats => print_json(&adapter.link_stats().await?),
        Command::Arp => print_json(&adapter.arp_table().await?),
        Command::Leases => print_json(&adapter.dhcp_leases().await?),
        Command::Clients => print_json(&adapter.connected_devices().await?),
        Command::Wireless => print_json(&adapter.wireless_settings().await?),
        Command::Dhcp => print_json(&adapter.dhcp_settings().await?),
        Command::Forwards => print_json(&adapter.port_forwards().await?),
        Command::Qos => print_json(&adapter.qos_rules().await?),
        Command::Firewall => print_json(&adapter.firewall_settings().await?),
        Command::Ddns => print_json(&adapter.ddns_settings().await?),
        Command::SetWifi {
            ssid,
            password,
            channel,
            enabled,
        } => {
            let update = WirelessUpdate {
                ssid,
                password,
                channel,
                enabled,
            };
            report(adapter.set_wireless(&update).await?)
        }
        Command::SetDhcp {
            enabled,
            start_ip,
            end_ip,
            lease_seconds,
        } => {
            let update = DhcpUpdate {
                enabled,
                start_ip,
                end_ip,
                lease_seconds,
            };
            report(adapter.set_dhcp(&update).await?)
        }
        Command::FilterSet { slot, mac, active } => {
            let update = MacFilterUpdate { active, mac };
            report(adapter.set_mac_filter(slot, &update).await?)
        }
        Command::ForwardSet {
            slot,
            name,
            protocol,
            external_port,
            internal_port,
            internal_ip,
            active,
        } => {
            let update = PortForwardUpdate {
                active,
                name,
                protocol,
                external_port,
                internal_port,
                internal_ip,
            };
            report(adapter.set_port_forward(slot, &update).await?)
        }
        Command::QosSet {
            slot,
            name,
            priority,
            protocol,
            port,
            active,
        } => {
            let update = QosRuleUpdate {
                active,
                name,
                priority,
                protocol,
                port,
            };
            report(adapter.set_qos_rule(slot, &update).await?)
        }
        Command::SetPassword { new_password } => {
            report(adapter.set_admin_password(&new_password).await?)
        }
        Command::Restart { yes } => {
            if !yes {
                anyhow::bail!("refusing to reboot without --yes");
            }
            report(adapter.restart().await?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(result: OperationResult) -> Result<()> {
    if result.success {
        tracing::info!("{}", result.message);
    } else {
        tracing::error!("{}", result.message);
    }
    print_json(&result)?;
    if result.success {
        Ok(())
    } else {
        anyhow::bail!("{}", result.message)
    }
}
