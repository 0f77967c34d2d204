//! # dtsh Entry Point
//!
//! ## Usage
//!
//! ```bash
//! # Browse a devicetree model
//! dtsh build/zephyr/board.json
//!
//! # Also search bindings in extra directories
//! dtsh board.json -b dts/bindings -b ../modules/bindings
//!
//! # Pick a theme, log to a file
//! dtsh board.json --theme Nord --log /tmp/dtsh.log --log-level debug
//! ```
//!
//! ## Key Bindings
//!
//! - `Tab` - Complete the word under the cursor, list candidates when ambiguous
//! - `Ctrl+d` - Close the session (on an empty line)
//! - `Ctrl+c` - Drop the line being edited
//! - `Up` / `Down` - Navigate the command history

use dtsh::logging;
use dtsh::session::{Session, SessionOptions};

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// dtsh - Shell-like interface to a devicetree
#[derive(Parser, Debug)]
#[command(name = "dtsh")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Shell-like interface to a devicetree", long_about = None)]
struct Args {
    /// Devicetree model (JSON) to browse
    #[arg(value_name = "DT")]
    dt_source: PathBuf,

    /// Directory to search for binding files (repeatable)
    #[arg(short = 'b', long = "bindings", value_name = "DIR")]
    bindings: Vec<PathBuf>,

    /// Theme name, overriding the configuration file
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Print a blank line after each command
    #[arg(long)]
    sparse: bool,

    /// Configuration directory (default: platform config dir)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Log level when logging to a file
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: tracing::Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dtsh: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let _log_guard = match &args.log {
        Some(path) => Some(logging::init_file_logging(path, args.log_level)?),
        None => None,
    };

    let options = SessionOptions {
        dt_source: args.dt_source,
        binding_dirs: args.bindings,
        config_dir: args.config_dir,
        theme: args.theme,
        sparse: args.sparse,
    };
    let mut session = Session::open(options).context("Failed to open session")?;
    session.run();
    Ok(())
}
