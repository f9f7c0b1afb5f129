//! `modulock` daemon: controller loop, web interface and text console.

mod simulator;

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use modulock_core::constants::{MAX_PULSE_MS, MAX_TICK_MS};
use modulock_engine::{Controller, ControllerConfig};
use modulock_hardware::mock::{MockOutputs, MockReader};
use modulock_network::{
    AppState, ConsoleConfig, ConsoleServer, PresenceCookieAuth, WebConfig, WebServer,
};
use modulock_storage::{CredentialStore, RosterFileConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "modulock", version, about)]
struct Args {
    /// Roster file
    #[arg(long, default_value = "users.json", env = "MODULOCK_ROSTER")]
    roster: PathBuf,

    /// Web interface listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "MODULOCK_WEB_ADDR")]
    web_addr: SocketAddr,

    /// Text console listen address
    #[arg(long, default_value = "0.0.0.0:2323", env = "MODULOCK_CONSOLE_ADDR")]
    console_addr: SocketAddr,

    /// Maximum simultaneous console sessions
    #[arg(long, default_value_t = 4, env = "MODULOCK_CONSOLE_MAX_CONNECTIONS")]
    console_max_connections: usize,

    /// Administrator login name
    #[arg(long, default_value = "admin", env = "MODULOCK_ADMIN_USER")]
    admin_user: String,

    /// Administrator password
    #[arg(long, default_value = "123", env = "MODULOCK_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,

    /// Control loop period in milliseconds
    #[arg(
        long,
        default_value_t = 10,
        env = "MODULOCK_TICK_MS",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TICK_MS)
    )]
    tick_ms: u64,

    /// Lock release pulse in milliseconds
    #[arg(
        long,
        default_value_t = 1000,
        env = "MODULOCK_LOCK_PULSE_MS",
        value_parser = clap::value_parser!(u64).range(0..=MAX_PULSE_MS)
    )]
    lock_pulse_ms: u64,

    /// Indicator pulse in milliseconds
    #[arg(
        long,
        default_value_t = 2000,
        env = "MODULOCK_INDICATOR_PULSE_MS",
        value_parser = clap::value_parser!(u64).range(0..=MAX_PULSE_MS)
    )]
    indicator_pulse_ms: u64,

    /// How long a scanned UID is offered to the registration page, in milliseconds
    #[arg(long, default_value_t = 30_000, env = "MODULOCK_SCAN_STALENESS_MS")]
    scan_staleness_ms: u64,

    /// Log filter, used when RUST_LOG is not set
    #[arg(long, default_value = "info", env = "MODULOCK_LOG")]
    log_filter: String,

    /// Do not read simulated card taps from standard input
    #[arg(long)]
    no_stdin_reader: bool,
}

impl Args {
    fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::default()
            .tick_interval(Duration::from_millis(self.tick_ms))
            .lock_pulse(Duration::from_millis(self.lock_pulse_ms))
            .indicator_pulse(Duration::from_millis(self.indicator_pulse_ms))
            .scan_staleness(Duration::from_millis(self.scan_staleness_ms))
    }

    fn web_config(&self) -> WebConfig {
        WebConfig::default()
            .bind_addr(self.web_addr)
            .admin(&self.admin_user, &self.admin_password)
    }

    fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig::default()
            .bind_addr(self.console_addr)
            .max_connections(self.console_max_connections)
    }
}

fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)
            .with_context(|| format!("invalid log filter '{fallback}'"))?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_filter)?;

    info!(
        version = modulock_core::VERSION,
        roster = %args.roster.display(),
        "starting modulock"
    );

    let store = CredentialStore::open(RosterFileConfig::new(&args.roster).backend());
    let (reader, cards) = MockReader::new();
    let (outputs, _probe) = MockOutputs::new();
    let (controller, handle) = Controller::new(args.controller_config(), store, reader, outputs);

    let web_config = args.web_config();
    let web = WebServer::bind(
        &web_config,
        AppState::new(handle.clone(), PresenceCookieAuth::new(&web_config)),
    )
    .await
    .context("failed to start web interface")?;
    let console = ConsoleServer::bind(args.console_config(), handle)
        .await
        .context("failed to start text console")?;

    let shutdown = CancellationToken::new();

    if !args.no_stdin_reader {
        simulator::spawn_reader(BufReader::new(std::io::stdin()), cards, shutdown.clone())
            .context("failed to start simulated reader input")?;
    }

    let controller_task = tokio::spawn(controller.run(shutdown.clone().cancelled_owned()));
    let web_task = tokio::spawn(web.serve(shutdown.clone().cancelled_owned()));
    let console_task = tokio::spawn(console.run(shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutdown requested");
    shutdown.cancel();

    let (controller_result, web_result, console_result) =
        tokio::join!(controller_task, web_task, console_task);
    controller_result?;
    web_result??;
    console_result??;

    info!("modulock stopped");
    Ok(())
}
