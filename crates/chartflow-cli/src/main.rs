//! Chartflow CLI - tabular analytics from the command line.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --verbose.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Inspect { file, sheet, json } => {
            commands::inspect::run(file, sheet, json, config, cli.verbose)
        }

        Commands::Correlate {
            file,
            x,
            y,
            sheet,
            json,
        } => commands::correlate::run(file, x, y, sheet, json, config),

        Commands::Clean {
            file,
            sheet,
            fix_formats,
            fill,
            split,
            delimiter,
            split_into,
            rename,
            output,
        } => commands::clean::run(
            commands::clean::CleanArgs {
                file,
                sheet,
                fix_formats,
                fill,
                split,
                delimiter,
                split_into,
                rename,
                output,
            },
            config,
        ),

        Commands::Serve { file, sheet, port } => commands::serve::run(file, sheet, port, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
