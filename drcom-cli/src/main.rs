use std::path::Path;

use anyhow::{Context, Result};
use drcom_capture::{analyse_file, list_interfaces, InterfaceNetworkInfo};
use drcom_cli::config::analysis_toml;
use drcom_cli::{logging, Cli, Commands, Config, PidFile};
use drcom_client::{Cancellation, Driver, Transport, UdpTransport};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command() {
        Commands::GenerateConfig => {
            print!("{}", Config::template()?);
            Ok(())
        }
        Commands::Analyse { capture } => analyse(&cli, &capture),
        Commands::Interfaces => interfaces(),
        Commands::Start => start(&cli).await,
    }
}

fn analyse(cli: &Cli, capture: &Path) -> Result<()> {
    logging::init(cli.verbose, "warn", cli.log_file.as_deref())?;
    let analysis = analyse_file(capture)
        .with_context(|| format!("failed to analyse {}", capture.display()))?;
    print!("{}", analysis_toml(&analysis)?);
    Ok(())
}

fn interfaces() -> Result<()> {
    for iface in list_interfaces()? {
        let mac = iface
            .mac
            .map(|mac| mac.to_string())
            .unwrap_or_else(|| "-".to_string());
        let ipv4 = iface
            .primary_ipv4()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());
        let flags = match (iface.is_up, iface.is_loopback) {
            (_, true) => "loopback",
            (true, false) => "up",
            (false, false) => "down",
        };
        println!("{:<16} {:<18} {:<16} {}", iface.name, mac, ipv4, flags);
    }
    Ok(())
}

/// Cancel on Ctrl-C, and on SIGTERM where available
fn spawn_signal_handler(cancel: Cancellation) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => info!("Ctrl+C received"),
                        _ = term.recv() => info!("SIGTERM received"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Cannot listen for SIGTERM");
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Ctrl+C received");
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("Ctrl+C received");
        }
        cancel.cancel();
    });
}

async fn start(cli: &Cli) -> Result<()> {
    let (path, config) = Config::discover(cli.config.as_deref())?;

    let log_file = cli
        .log_file
        .as_deref()
        .or(config.application.log_file.as_deref());
    logging::init(cli.verbose, &config.application.log_level, log_file)
        .context("failed to open log file")?;
    info!(config = %path.display(), "Loaded configuration");

    let net = InterfaceNetworkInfo::new(config.drcom.interface.clone());
    let session = config.session(&net)?;
    let tunables = config.tunables()?;

    let transport = UdpTransport::bind(
        config.bind_ip()?,
        tunables.port_range.clone(),
        session.server_addr,
        tunables.recv_timeout,
    )
    .await?;

    info!(
        server = %session.server_addr,
        username = %session.username,
        password = %session.masked_password(),
        mac = %session.mac,
        host_ip = %session.host_ip,
        local = %transport.local_addr()?,
        "Drcom client starting"
    );

    let _pid_file = match &config.application.pid_file {
        Some(pid_path) => Some(
            PidFile::create(pid_path)
                .with_context(|| format!("failed to write {}", pid_path.display()))?,
        ),
        None => None,
    };

    let cancel = Cancellation::new();
    spawn_signal_handler(cancel.clone());

    let mut driver = Driver::new(session, transport, tunables, cancel);
    let summary = driver.run().await?;

    info!(
        sessions = summary.sessions,
        logout_acknowledged = summary.logout_acknowledged,
        "Drcom client stopped"
    );
    Ok(())
}
