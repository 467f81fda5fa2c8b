use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use env_logger::Env;
use siamese_convert::cli::{CifarCommand, SubCommand};

fn main() -> Result<()> {
    let command = match CifarCommand::try_parse() {
        Ok(command) => command,
        // 参数个数不对时只打印用法，退出码仍为 0
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::UnknownArgument
                    | ErrorKind::TooManyValues
            ) =>
        {
            e.print()?;
            println!("{}", CifarCommand::command().render_help());
            return Ok(());
        }
        Err(e) => e.exit(),
    };

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    command.run()
}
