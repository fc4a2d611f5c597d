//! # Queuebill Entry Point
//!
//! ## Startup Sequence
//! 1. Parse the command line
//! 2. Initialize tracing (stderr)
//! 3. Hand off to [`queuebill_counter::cli::run`]
//!
//! Startup failures (config, database) end the process with exit code 1.

use clap::Parser;

use queuebill_counter::cli::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    queuebill_counter::init_tracing();

    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
