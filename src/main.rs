use crate::config::{read_config, AppConfig};
use crate::db::listings::count_listings;
use crate::db::{init_db, Database};
use crate::ingest::{scrape_listings, IngestJob, IngestParams};
use crate::router::respond;
use crate::scrape::HttpClient;
use anyhow::{Context, Result};
use astra::{Request, Server};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

mod config;
mod db;
mod domain;
mod errors;
mod ingest;
mod logging;
mod query;
mod responses;
mod router;
mod scrape;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(name = "immo_scout")]
#[command(about = "Scrape ImmobilienScout24 listings and serve them as JSON")]
struct Cli {
    /// TOML config file; falls back to $IMMO_CONFIG, then built-in defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the listings API
    Serve,

    /// Scrape one location and upsert the results
    Scrape(LocationArgs),

    /// Scrape a few listings and print them, storing nothing
    Preview(LocationArgs),
}

#[derive(Args)]
struct LocationArgs {
    /// Rentals instead of listings for sale
    #[arg(long)]
    rental: bool,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    district: Option<String>,
    /// Stop after this many listings
    #[arg(long)]
    limit: Option<usize>,
}

impl LocationArgs {
    fn into_params(self, config: &AppConfig) -> IngestParams {
        let defaults = IngestParams::from_defaults(&config.ingest);
        IngestParams {
            is_rental: self.rental,
            state: self.state.unwrap_or(defaults.state),
            city: self.city.unwrap_or(defaults.city),
            district: self.district.unwrap_or(defaults.district),
            limit: self.limit,
        }
    }
}

const PREVIEW_LIMIT: usize = 10;

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = read_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve => serve(&config),
        Commands::Scrape(args) => {
            let params = args.into_params(&config);
            let db = Database::new(config.store.db_path.as_str());
            init_db(&db).context("Database initialization failed")?;

            let client = HttpClient::new(&config.scraper)?;
            let report = IngestJob::new(&client, &db, &config.scraper, &config.ingest)
                .run(&params)
                .context("Scrape failed")?;

            let total = count_listings(&db)?;
            println!("Created {} entries ({total} stored).", report.written);
            Ok(())
        }
        Commands::Preview(args) => {
            let mut params = args.into_params(&config);
            params.limit = Some(params.limit.unwrap_or(PREVIEW_LIMIT));

            let client = HttpClient::new(&config.scraper)?;
            let mut found = 0;
            scrape_listings(&client, &config.scraper, &params, |listing| {
                found += 1;
                match serde_json::to_string(&listing) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(id = %listing.id, "could not encode listing: {e}"),
                }
                Ok(())
            })
            .context("Preview failed")?;

            println!("Found {found} items.");
            Ok(())
        }
    }
}

fn serve(config: &AppConfig) -> Result<()> {
    let db = Database::new(config.store.db_path.as_str());
    init_db(&db).context("Database initialization failed")?;

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(config.server.max_workers);

    server
        .serve(move |req: Request, _info| respond(req, &db))
        .context("Server ended with error")?;

    tracing::info!("Server shut down cleanly.");
    Ok(())
}
