use boardfix::cli::{Cli, Commands};
use boardfix::cli_handlers;
use clap::Parser;
use std::process;

fn main() {
    // Diagnostics go to stderr; stdout is reserved for success output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Create { db } => cli_handlers::handle_create(&db),
        Commands::Verify { db } => cli_handlers::handle_verify(&db),
        Commands::RoundTrip { db } => cli_handlers::handle_round_trip(&db),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
