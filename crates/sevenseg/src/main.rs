//! sevenseg — toggle the segments of a 7-segment display through its device file.
//!
//! Thin front end over `sevenseg-lib`: reads the display state once at
//! startup, then issues toggle requests.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "sevenseg",
    version,
    about = "Toggle the segments of a 7-segment display through its device file"
)]
struct Args {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Device file (overrides SEVENSEG_DEVICE and the config file)
    #[arg(long, global = true, value_name = "PATH")]
    device: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let opts = cli::GlobalOpts {
        json: args.json,
        device: args.device,
        config: args.config,
    };

    if let Err(e) = cli::run(args.command, &opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
