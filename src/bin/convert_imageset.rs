use std::process::exit;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use env_logger::Env;
use siamese_convert::cli::{ImagesetCommand, SubCommand};

fn main() -> Result<()> {
    let command = match ImagesetCommand::try_parse() {
        Ok(command) => command,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            e.print()?;
            exit(1);
        }
    };

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    command.run()
}
