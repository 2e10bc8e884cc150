use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use code_smash_cli::commands;
use code_smash_cli::config::{Cli, Command, TaskCommand};

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.api_config() {
        Ok(config) => config,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    match &cli.command {
        Command::Task(TaskCommand::Apply(args)) => match commands::apply(&config, args)? {
            Some(report) => {
                println!("{report}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                println!("None");
                Ok(ExitCode::FAILURE)
            }
        },
    }
}
