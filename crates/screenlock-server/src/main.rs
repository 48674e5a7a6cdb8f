//! screenlockd
//!
//! Replays a request script against the session-lock server with logging
//! collaborators, one request per line, and reports every effect through
//! `tracing`. Reads stdin unless `--script` is given.

use std::{
    io::{self, IsTerminal},
    path::PathBuf,
};

use clap::Parser;
use screenlock_server::{
    LockConfig, LockServer, PermalockOverlay, Phase, ServerConfig,
    commands::{self, Command},
    console::{ConsoleCompositor, ConsoleRenderer},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Session-lock protocol request replayer
#[derive(Parser, Debug)]
#[command(name = "screenlockd", version, about)]
struct Args {
    /// Script file to replay (defaults to stdin)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Font description for the permalock message
    #[arg(long, default_value = "monospace 10")]
    font: String,

    /// Treat the permalock message as Pango markup
    #[arg(long)]
    markup: bool,

    /// Maximum bound control objects
    #[arg(long, default_value_t = 64)]
    max_lockers: usize,

    /// Maximum live visibility handles
    #[arg(long, default_value_t = 4096)]
    max_visibility_handles: usize,

    /// Number of simulated seats
    #[arg(long, default_value_t = 1)]
    seats: usize,

    /// Output scale used for the permalock message
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Log filter (overrides RUST_LOG)
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            lock: LockConfig {
                max_lockers: self.max_lockers,
                max_visibility_handles: self.max_visibility_handles,
            },
            font: self.font.clone(),
            pango_markup: self.markup,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (filter, bad_filter) = match &args.log_filter {
        Some(filter) => match EnvFilter::try_new(filter) {
            Ok(filter) => (filter, None),
            Err(err) => (EnvFilter::new("info"), Some(err)),
        },
        None => (EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")), None),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
    if let Some(err) = bad_filter {
        warn!(error = %err, "invalid log filter, using info");
    }

    let mut input: Box<dyn AsyncBufRead + Unpin> = match &args.script {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let config = args.server_config();
    let mut server = LockServer::new(&config, ConsoleCompositor::with_seats(args.seats));
    let mut overlay = PermalockOverlay::new(&config);
    let mut renderer = ConsoleRenderer;

    let mut buf = Vec::new();
    let mut line_no = 0usize;
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;
        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!(line = line_no, "line is not valid UTF-8");
            continue;
        };
        match commands::parse(line.trim_end_matches(['\n', '\r'])) {
            Command::Empty => {},
            Command::Request(request) => {
                let before = server.phase();
                server.handle(request);

                let after = server.phase();
                if before != Phase::Permalocked && after == Phase::Permalocked {
                    if let Some(message) = overlay.image(after, &mut renderer, args.scale) {
                        info!(line = line_no, text = %message.join(" / "), "permalock overlay");
                    }
                }
            },
            Command::State => {
                let manager = server.manager();
                info!(
                    line = line_no,
                    phase = ?manager.phase(),
                    persist_on_crash = manager.persist_on_crash(),
                    lockers = manager.lockers().len(),
                    visibility_handles = manager.visibility().len(),
                    redraws = server.compositor().redraws(),
                    "state"
                );
            },
            Command::Unknown { input } => warn!(line = line_no, %input, "unknown command"),
            Command::InvalidArgs { command, error } => {
                warn!(line = line_no, %command, %error, "invalid arguments");
            },
        }
    }

    info!(lines = line_no, phase = ?server.phase(), "script finished");
    Ok(())
}
