//! Example: scan a directory and print one JSON record per line.
//!
//! ```text
//! cargo run -p docsift-discovery --example scan_tree -- /path/to/documents
//! ```
//!
//! Configuration comes from the platform config file plus `DOCSIFT_*`
//! environment overrides. Log verbosity follows `RUST_LOG`.

use docsift_core::DocsiftConfig;
use docsift_discovery::Scanner;
use std::io::{self, Write};

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,docsift=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let config = DocsiftConfig::load_with_env()?;
    let scanner = Scanner::new(&config)?;

    let records = match scanner.scan(&root) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(Box::new(e));
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
    }

    eprintln!("{} records from {root}", records.len());
    Ok(())
}
