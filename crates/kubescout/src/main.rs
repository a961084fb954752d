//! kubescout CLI.

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use kubescout::cli::{bin_name, Cli};
use kubescout::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let argv0 = std::env::args_os().next();
    let matches = Cli::command()
        .bin_name(bin_name(argv0.as_deref()))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    logging::init(cli.global.log_level);

    cli.run().await
}
