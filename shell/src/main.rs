extern crate instafeed_shell;
extern crate tokio;

use clap::Parser;

use instafeed_shell::cli::Cli;
use instafeed_shell::{Shell, ShellError};

#[tokio::main]
async fn main() -> Result<(), ShellError> {
    instafeed_shell::init_logger();
    let cli = Cli::parse();

    let config = cli.config()?;
    let shell = Shell::connect(&config)?;

    print!("{}", shell.run(cli.command).await?);
    Ok(())
}
