use clap::Parser;
use eyre::Result;
use pipebuf::{CancelToken, Channel, PipeBufError};
use serde::Deserialize;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[clap(name = "pipe_demo")]
#[clap(about = "Pumps bytes through a blocking channel and demonstrates cancellation", long_about = None)]
struct Args {
    /// Optional TOML file overriding capacity and chunk size
    #[clap(short, long)]
    config: Option<String>,

    #[clap(short = 'n', long, default_value_t = 1_000_000)]
    bytes: usize,

    #[clap(long, default_value_t = 4096)]
    capacity: usize,

    #[clap(long, default_value_t = 256)]
    chunk_size: usize,

    #[clap(short, long, default_value_t = 100_000)]
    print_interval: usize,
}

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default = "default_capacity")]
    capacity: usize,

    #[serde(default = "default_chunk_size")]
    chunk_size: usize,
}

fn default_capacity() -> usize {
    4096
}

fn default_chunk_size() -> usize {
    256
}

impl Config {
    fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    debug!(?args, "demo configuration");

    let (capacity, chunk_size) = match &args.config {
        Some(path) => {
            let config = Config::load(path)?;
            (config.capacity, config.chunk_size)
        }
        None => (args.capacity, args.chunk_size),
    };

    info!(capacity, chunk_size, bytes = args.bytes, "starting pump");

    let channel = Channel::new(capacity)?;
    let session = channel.open()?;
    let cancel = CancelToken::new();
    let start = Instant::now();

    thread::scope(|scope| -> Result<()> {
        scope.spawn(|| {
            let mut chunk = vec![0u8; chunk_size];
            let mut sent = 0usize;
            while sent < args.bytes {
                let len = chunk_size.min(args.bytes - sent);
                for (i, byte) in chunk[..len].iter_mut().enumerate() {
                    *byte = ((sent + i) % 251) as u8;
                }
                session
                    .write_slice(&chunk[..len], &cancel)
                    .expect("writer interrupted");
                sent += len;
            }
        });

        let mut received = 0usize;
        let mut chunk = vec![0u8; chunk_size];
        let mut next_report = args.print_interval;
        while received < args.bytes {
            let count = session.read_slice(&mut chunk, &cancel)?;
            for (i, &byte) in chunk[..count].iter().enumerate() {
                let expected = ((received + i) % 251) as u8;
                assert_eq!(byte, expected, "corrupted byte at offset {}", received + i);
            }
            received += count;

            if received >= next_report {
                info!(
                    received,
                    occupancy = channel.occupancy(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "progress update"
                );
                next_report += args.print_interval;
            }
        }
        Ok(())
    })?;

    let stats = channel.stats();
    info!(
        bytes_written = stats.bytes_written,
        bytes_read = stats.bytes_read,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "pump complete"
    );

    // cancellation demo: a writer with no reader blocks once the buffer
    // fills, then aborts when the token fires
    let cancel = CancelToken::new();
    thread::scope(|scope| {
        let writer = {
            let cancel = cancel.clone();
            let session = &session;
            let oversized = vec![0u8; capacity * 2];
            scope.spawn(move || session.write_slice(&oversized, &cancel))
        };

        thread::sleep(Duration::from_millis(10));
        cancel.cancel();

        match writer.join().unwrap() {
            Err(PipeBufError::Interrupted { transferred }) => {
                warn!(transferred, "writer interrupted as requested");
            }
            other => warn!(?other, "writer finished before cancellation landed"),
        }
    });

    Ok(())
}
