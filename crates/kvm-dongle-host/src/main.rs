//! kvm-dongle: forwards keyboard and mouse input to a serial HID-emulation
//! dongle.
//!
//! # Usage
//!
//! ```text
//! kvm-dongle [OPTIONS]
//!
//! Options:
//!   --config <PATH>       Config file [default: platform config dir]
//!   --port <PATH>         Serial port; overrides config and discovery
//!   --script <PATH>       Read events from a file instead of stdin
//!   --dry-run             Log packets instead of writing to the port
//!   --list-ports          Print available serial ports and exit
//!   --write-config        Write the effective config file and exit
//!   --log-level <LEVEL>   Log level when RUST_LOG is unset
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load config, init tracing
//!  └─ pick sink: SerialTransport | LoggingSink (--dry-run)
//!  └─ spawn_dispatcher()        -- owns ForwardInputUseCase on its own thread
//!  └─ spawn_script_reader()     -- stdin/file lines -> InputEvent -> channel
//!       └─ select! (end of input) with Ctrl+C
//! ```
//!
//! `main` holds the only strong channel sender; the reader thread holds a
//! weak one.  Dropping it (end of input or Ctrl+C) lets the dispatcher drain
//! the queue and exit; `main` then joins it and logs the totals.  A reader
//! still blocked on stdin at that point is abandoned with the process.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kvm_dongle_host::application::dispatcher::{spawn_dispatcher, EVENT_QUEUE_DEPTH};
use kvm_dongle_host::application::forward_input::{ForwardInputUseCase, PacketSink};
use kvm_dongle_host::infrastructure::input_source::spawn_script_reader;
use kvm_dongle_host::infrastructure::storage::config::{
    config_file_path, load_config, load_config_from, save_config_to, AppConfig,
};
use kvm_dongle_host::infrastructure::transport::{
    discover_port, list_ports, LoggingSink, SerialTransport,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Drive a target machine's keyboard and mouse through a serial KVM dongle.
#[derive(Debug, Parser)]
#[command(
    name = "kvm-dongle",
    about = "Forward keyboard and mouse input to a serial HID-emulation dongle",
    version
)]
struct Cli {
    /// Configuration file.  Defaults to `config.toml` in the platform config
    /// directory; a missing file means built-in defaults.
    #[arg(long, env = "KVM_DONGLE_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port path (e.g. `/dev/tty.usbserial-1420`, `COM3`).
    #[arg(long, env = "KVM_DONGLE_PORT")]
    port: Option<String>,

    /// Event script to replay.  Standard input is read when absent.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Verify and log packets instead of opening the serial port.
    #[arg(long)]
    dry_run: bool,

    /// Print the serial ports the OS reports and exit.
    #[arg(long)]
    list_ports: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,

    /// Log level used when `RUST_LOG` is unset.  Overrides the config file.
    #[arg(long, env = "KVM_DONGLE_LOG")]
    log_level: Option<String>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => load_config().context("failed to load config"),
        }
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no config path available"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = cli.load_config()?;
    if let Some(port) = &cli.port {
        config.serial.port = Some(port.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    if cli.list_ports {
        for name in list_ports().context("failed to enumerate serial ports")? {
            println!("{name}");
        }
        return Ok(());
    }

    if cli.write_config {
        let path = cli.config_path()?;
        save_config_to(&config, &path)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        info!(path = %path.display(), "config written");
        return Ok(());
    }

    info!("kvm-dongle starting");

    // ── Packet sink ───────────────────────────────────────────────────────────
    let sink: Arc<dyn PacketSink> = if cli.dry_run {
        info!("dry run: packets are logged, not sent");
        Arc::new(LoggingSink::new())
    } else {
        let port = match &config.serial.port {
            Some(port) => port.clone(),
            None => discover_port(&config.serial.port_prefix)
                .context("no dongle port configured and none discovered")?,
        };
        Arc::new(
            SerialTransport::open(&port, &config.serial.settings())
                .with_context(|| format!("failed to open {port}"))?,
        )
    };

    // ── Dispatcher thread ─────────────────────────────────────────────────────
    let use_case = ForwardInputUseCase::new(Arc::new(config.input.keymap.table()), sink)
        .with_key_up_policy(config.input.key_up);
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let dispatcher = spawn_dispatcher(use_case, rx).context("failed to start dispatcher")?;

    // ── Input source ──────────────────────────────────────────────────────────
    let reader: Box<dyn BufRead + Send> = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            info!(script = %path.display(), "replaying event script");
            Box::new(BufReader::new(file))
        }
        None => {
            info!("reading events from stdin");
            Box::new(BufReader::new(io::stdin()))
        }
    };
    let finished =
        spawn_script_reader(reader, tx.downgrade()).context("failed to start script reader")?;

    tokio::select! {
        result = finished => {
            let forwarded = result
                .context("script reader exited without a result")?
                .context("failed to read events")?;
            info!(events = forwarded, "input finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    drop(tx);

    // The last strong sender is gone; wait for the dispatcher to drain.
    let stats = tokio::task::spawn_blocking(move || dispatcher.join())
        .await
        .context("failed to join dispatcher")?
        .map_err(|_| anyhow!("dispatcher thread panicked"))?;

    info!(
        events = stats.events,
        packets = stats.packets,
        failed = stats.failed,
        unmapped = stats.unmapped,
        outside_video = stats.outside_video,
        "kvm-dongle stopped"
    );
    Ok(())
}
