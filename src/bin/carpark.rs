//! Carpark Server Binary
//!
//! Command-line entry point:
//! - `serve` starts the HTTP API
//! - `config` prints the effective configuration
//! - `version` prints the version
//!
//! # Examples
//!
//! ```bash
//! # Start server with a pre-initialized lot of 50 slots
//! carpark serve --bind 0.0.0.0 --port 3000 --slots 50
//!
//! # Show configuration after file/env/flag layering
//! carpark --config carpark.toml config
//! ```

use carpark::config::{AppConfig, LoggingConfig};
use carpark::pool::{ParkingLot, SharedParkingLot};
use carpark::server::start_server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Carpark - parking slot allocation service
#[derive(Parser, Debug)]
#[command(name = "carpark")]
#[command(version = carpark::VERSION)]
#[command(about = "Carpark - parking slot allocation service", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./carpark.toml if present)
    #[arg(long, global = true, env = "CARPARK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log directory for daily rolling files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Print the effective configuration as TOML
    Config,

    /// Show version
    Version,
}

/// Server arguments
#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// HTTP bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Initialize the lot with this many slots at start-up
    #[arg(short, long)]
    slots: Option<u32>,

    /// Disable CORS
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.logging.directory = Some(dir.clone());
    }

    match cli.command {
        Commands::Serve(args) => {
            apply_serve_args(&mut config, &args);
            let _guard = setup_logging(&config.logging, cli.no_color)?;
            serve_command(config).await
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Version => {
            println!("Carpark {}", carpark::VERSION);
            Ok(())
        }
    }
}

fn apply_serve_args(config: &mut AppConfig, args: &ServeArgs) {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(slots) = args.slots {
        config.pool.initial_slots = Some(slots);
    }
    if args.no_cors {
        config.server.enable_cors = false;
    }
}

/// Setup logging: console output plus optional rolling files
///
/// The returned guard flushes the file writer on drop.
fn setup_logging(logging: &LoggingConfig, no_color: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let log_level = logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let console = if logging.json {
        fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(!no_color)
            .boxed()
    };

    let (file, guard) = match &logging.directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, "carpark.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .init();

    Ok(guard)
}

/// Serve command - start the HTTP server
async fn serve_command(config: AppConfig) -> anyhow::Result<()> {
    info!(version = %carpark::VERSION, "Carpark starting");

    let lot = ParkingLot::from_config(config.pool.clone())?;
    if lot.is_initialized() {
        info!(total_slots = lot.total_slots(), "Parking lot pre-initialized");
    } else {
        info!("Parking lot awaiting initialization (POST /parking_lot)");
    }

    start_server(config.server, SharedParkingLot::new(lot)).await
}
