// bitrate-cli/src/main.rs
//
// Main entry point for the bitrate-calc CLI application.
//
// Responsibilities:
// - Parsing command-line arguments.
// - Initialising logging.
// - Warning when ffprobe/ffmpeg are not installed.
// - Running the core resolver and printing its report.
// - Managing the process exit code.

use bitrate_cli::{Cli, logging, render_report};
use bitrate_core::{calculate_bitrate, check_dependency};
use clap::Parser;
use std::process;

fn run(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    // Missing tools are not fatal here: the resolver absorbs probe failures
    // and reports extraction failures with their own errors.
    for tool in ["ffprobe", "ffmpeg"] {
        if let Err(e) = check_dependency(tool) {
            log::warn!("{}", e);
        }
    }

    let config = cli.resolver_config();
    log::debug!(
        "Temporary files: {}/{}_*",
        config.temp_dir.display(),
        config.temp_base
    );

    let report = calculate_bitrate(&cli.file_path, config)?;
    Ok(render_report(&report, cli.json)?)
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
