// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

use std::io::{self, Write as _};
use std::process::exit;

use clap::Parser;
use log::debug;
use msiq::cli::Cli;
use msiq::error::{Error, IoContext};
use msiq::{config, output};

fn run(cli: Cli) -> Result<(), Error> {
    let config = config::load()?;
    let invocation = cli.into_invocation(&config);
    debug!("{:?}", invocation.command);

    let outcome = msiq::execute(
        &invocation.command,
        invocation.dry_run,
        msiq_engine::system_installer,
    )?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::render(&outcome, invocation.format, &mut out)?;
    out.flush().io_context(|| "Failed to write output".to_string())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Usage errors, --help and --version exit here, before any configuration
    // is read.
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    };
    exit(code);
}
