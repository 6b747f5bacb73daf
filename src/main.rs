use clap::Parser;

use monotag::{
    cli::{self, Command},
    command,
    error::Result,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("monotag")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let orchestrator = command::common::build_orchestrator(&cli_args)?;

    match cli_args.command {
        Command::Release { json } => {
            command::release::execute(&orchestrator, json)?
        }
        Command::Detect => command::detect::execute(&orchestrator)?,
    }

    Ok(())
}
