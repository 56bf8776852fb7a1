mod mappings;
mod scrape;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mappings::MappingsCommands;

#[derive(Debug, Parser)]
#[command(name = "markt-cli")]
#[command(about = "Collects, normalizes and geocodes Dutch flea-market listings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect market page URLs from the calendar
    Gather {
        /// Where to write the URL list (defaults to MARKT_URLS_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Scrape, normalize and geocode every gathered market
    Scrape {
        /// URL list written by `gather` (defaults to MARKT_URLS_PATH)
        #[arg(long)]
        urls: Option<PathBuf>,
        /// Address mapping table (defaults to MARKT_MAPPINGS_PATH)
        #[arg(long)]
        mappings: Option<PathBuf>,
        /// Where to write the records (defaults to MARKT_OUTPUT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect the address mapping table
    Mappings {
        #[command(subcommand)]
        command: MappingsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = markt_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Gather { output }) => {
            let output = output.unwrap_or_else(|| config.urls_path.clone());
            scrape::run_gather(&config, &output).await?;
        }
        Some(Commands::Scrape {
            urls,
            mappings,
            output,
        }) => {
            let urls = urls.unwrap_or_else(|| config.urls_path.clone());
            let mappings = mappings.unwrap_or_else(|| config.mappings_path.clone());
            let output = output.unwrap_or_else(|| config.output_path.clone());
            scrape::run_scrape(&config, &urls, &mappings, &output).await?;
        }
        Some(Commands::Mappings { command }) => match command {
            MappingsCommands::List => mappings::run_mappings_list(&config.mappings_path),
            MappingsCommands::Unmapped { records } => {
                let records = records.unwrap_or_else(|| config.output_path.clone());
                mappings::run_mappings_unmapped(&records, &config.mappings_path)?;
            }
        },
        None => println!("markt-cli: run `markt-cli --help` for available commands"),
    }

    Ok(())
}
