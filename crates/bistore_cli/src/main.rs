//! bistore CLI
//!
//! Command-line tools for reading and patching files through a buffered
//! store.
//!
//! # Commands
//!
//! - `inspect` - Display file size and line statistics
//! - `dump` - Hex dump a byte range
//! - `patch` - Overwrite bytes in place
//! - `append` - Write bytes at the end
//! - `lines` - Print newline-terminated lines with a length limit

mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// bistore command-line file tools.
#[derive(Parser)]
#[command(name = "bistore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Bytes to write, given as text or hex.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct Payload {
    /// Bytes as UTF-8 text
    #[arg(short, long)]
    text: Option<String>,

    /// Bytes as hex digits, e.g. "de ad be ef"
    #[arg(short = 'x', long)]
    hex: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display file size and line statistics
    Inspect {
        /// Path to the file
        path: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Hex dump a byte range
    Dump {
        /// Path to the file
        path: PathBuf,

        /// Start from this offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Number of bytes to dump (default: to the end)
        #[arg(short, long)]
        length: Option<u64>,
    },

    /// Overwrite bytes in place
    Patch {
        /// Path to the file
        path: PathBuf,

        /// Offset of the first overwritten byte
        #[arg(short, long)]
        offset: u64,

        #[command(flatten)]
        payload: Payload,
    },

    /// Write bytes at the end of the file
    Append {
        /// Path to the file
        path: PathBuf,

        #[command(flatten)]
        payload: Payload,
    },

    /// Print newline-terminated lines
    Lines {
        /// Path to the file
        path: PathBuf,

        /// Start from this offset
        #[arg(short, long, default_value = "0")]
        offset: u64,

        /// Maximum line length in bytes, excluding the terminator
        #[arg(short, long, default_value = "8192")]
        max_len: u64,

        /// Maximum number of lines to print
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { path, format } => {
            commands::inspect::run(&path, &format)?;
        }
        Commands::Dump {
            path,
            offset,
            length,
        } => {
            commands::dump::run(&path, offset, length)?;
        }
        Commands::Patch {
            path,
            offset,
            payload,
        } => {
            let bytes = commands::payload(payload.text, payload.hex)?;
            commands::patch::run(&path, offset, &bytes)?;
        }
        Commands::Append { path, payload } => {
            let bytes = commands::payload(payload.text, payload.hex)?;
            commands::append::run(&path, &bytes)?;
        }
        Commands::Lines {
            path,
            offset,
            max_len,
            count,
        } => {
            commands::lines::run(&path, offset, max_len, count)?;
        }
        Commands::Version => {
            println!("bistore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("bistore core v{}", bistore_core::VERSION);
        }
    }

    Ok(())
}
