use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use listing_ingest::reference::transit;
use listing_ingest::{compute_summary, IngestConfig, IngestError, Ingestor};

#[derive(Parser, Debug)]
#[command(name = "listing-ingest", about = "Pull listings from the upstream table and normalize them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find a working view and describe the fields of its first record
    Probe,
    /// Run a full ingestion and print the report
    Fetch {
        /// Print only the normalized properties
        #[arg(long)]
        properties_only: bool,
    },
    /// Run a full ingestion and print aggregate statistics
    Stats,
    /// Fetch and normalize a single record
    Get { id: String },
    /// Search the bundled transit table (no network)
    Lines { query: Option<String> },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), IngestError> {
    if let Command::Lines { query } = &command {
        let lines = match query.as_deref() {
            Some(q) => transit::search_lines(q),
            None => transit::major_lines(),
        };
        print_json(&lines);
        return Ok(());
    }

    let config = IngestConfig::from_env()?;
    let ingestor = Ingestor::from_config(config)?;

    match command {
        Command::Probe => print_json(&ingestor.validate_connection()?),
        Command::Fetch { properties_only } => {
            let report = ingestor.run()?;
            if properties_only {
                print_json(&report.properties);
            } else {
                print_json(&report);
            }
        }
        Command::Stats => {
            let properties = ingestor.fetch_all()?;
            print_json(&compute_summary(&properties));
        }
        Command::Get { id } => match ingestor.fetch_by_id(&id)? {
            Some(property) => print_json(&property),
            None => {
                error!(record_id = %id, "no displayable record with that id");
                std::process::exit(1);
            }
        },
        Command::Lines { .. } => {}
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("failed to serialize output: {e}"),
    }
}
