//! CLI binary for the task board.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the library.

use std::process::ExitCode;

use clap::Parser;
use taskboard::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = taskboard::logging::init("warn") {
        eprintln!("Warning: logging init failed: {e}");
    }

    let output = cli::run(cli);

    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }

    output.exit_code
}
