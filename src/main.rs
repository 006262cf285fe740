mod commands;
mod render;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use staysync_core::api::ApiClient;
use staysync_core::config::StayConfig;
use staysync_core::session::FileSessionStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "staysync")]
#[command(version)]
#[command(about = "Sync rental property calendar feeds into draft reservations")]
struct Cli {
    /// Backend base URL (overrides api_url from the config file)
    #[arg(long, global = true, env = "STAYSYNC_API_URL")]
    api_url: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the reservations backend
    Login {
        email: String,

        /// Read the password from this flag instead of prompting
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Import bookings from every property's calendar feeds
    Sync {
        /// Only sync this property (by id)
        #[arg(short, long)]
        property: Option<String>,

        /// How many properties to sync at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the backend to sync one property's feeds itself
    ServerSync { property: String },
    /// List the calendar feeds configured on properties
    Feeds {
        /// Only show this property (by id)
        #[arg(short, long)]
        property: Option<String>,
    },
    /// Parse a local .ics file and show which events count as bookings
    Parse {
        file: std::path::PathBuf,

        /// Summary keywords marking a booking (defaults to the configured ones)
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
    /// Check whether a date range is free for a property
    Availability {
        property: String,

        /// Start date (YYYY-MM-DD or YYYYMMDD)
        start: String,

        /// End date (YYYY-MM-DD or YYYYMMDD)
        end: String,

        /// Ignore this reservation when looking for conflicts
        #[arg(long)]
        exclude: Option<String>,

        /// Also list every booked day of the property
        #[arg(long)]
        dates: bool,
    },
    /// Write a property's reservations as an iCal feed
    Export {
        property: String,

        /// Output file (defaults to <property-name>.ics)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.api_url)?;
    debug!(api_url = %config.api_url, "loaded config");

    match cli.command {
        Commands::Login { email, password } => {
            commands::login::run(&client(&config)?, &email, password).await
        }
        Commands::Logout => commands::logout::run(&client(&config)?),
        Commands::Whoami => commands::whoami::run(&client(&config)?),
        Commands::Sync {
            property,
            concurrency,
            json,
        } => {
            let api = client(&config)?;
            commands::sync::run(&api, &config, property.as_deref(), concurrency, json).await
        }
        Commands::ServerSync { property } => {
            commands::server_sync::run(&client(&config)?, &property).await
        }
        Commands::Feeds { property } => {
            commands::feeds::run(&client(&config)?, property.as_deref()).await
        }
        Commands::Parse { file, keywords } => {
            let keywords = if keywords.is_empty() {
                config.reservation_keywords.clone()
            } else {
                keywords
            };
            commands::parse::run(&file, &keywords)
        }
        Commands::Availability {
            property,
            start,
            end,
            exclude,
            dates,
        } => {
            commands::availability::run(
                &client(&config)?,
                &property,
                &start,
                &end,
                exclude.as_deref(),
                dates,
            )
            .await
        }
        Commands::Export { property, output } => {
            commands::export::run(&client(&config)?, &property, output).await
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STAYSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(api_url: Option<String>) -> Result<StayConfig> {
    let mut config = StayConfig::load()?;

    if let Some(url) = api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    Ok(config)
}

fn client(config: &StayConfig) -> Result<ApiClient> {
    let session = Arc::new(FileSessionStore::new(config.session_path()));
    Ok(ApiClient::from_config(config, session)?)
}
