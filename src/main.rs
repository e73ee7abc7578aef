use std::process::ExitCode;

use clap::Parser;
use gateway_probe::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    cli::run(Cli::parse()).await
}
