//! bookaudit CLI - main entry point

use bookaudit_cli::{commands, Cli, CliError};
use bookaudit_core::init_logging_from_config;
use clap::Parser;
use log::error;
use std::io::{self, Write};
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = execute(&cli) {
        error!("event=cli_command module=cli status=error error={}", err);
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

fn execute(cli: &Cli) -> Result<(), CliError> {
    let config = cli.store_config()?;

    // The CLI stays usable when logging cannot start.
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("Warning: {err}");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(cli, &config, &mut out)?;
    out.flush()?;
    Ok(())
}
