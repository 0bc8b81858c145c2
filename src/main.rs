mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Command::Plan => commands::stack::plan(&ctx, &cli.stack),
        Command::Apply(args) => commands::stack::apply(&ctx, &cli.stack, args.dry_run, args.yes),
        Command::Destroy { yes } => commands::stack::destroy(&ctx, &cli.stack, yes),
        Command::Outputs { json } => commands::stack::outputs(&cli.stack, json),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "authstack", &mut io::stdout());
            Ok(())
        }
    }
}
