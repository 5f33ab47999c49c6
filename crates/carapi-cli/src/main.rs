//! CarAPI CLI - Command-line tool for the CarAPI vehicle data service
//!
//! Looks up years, makes, models, trims, VINs and license plates, and
//! downloads the CSV data feed.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use carapi_client::{ApiVersion, Encoding, JsonSearchItem};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::query::{build_query, parse_filter, parse_param};
use crate::commands::{Family, Resource, Sdk};
use crate::config::{ArgOverrides, Config};
use crate::output::OutputContext;

#[derive(Parser)]
#[command(name = "carapi-cli")]
#[command(author, version, about = "CarAPI Vehicle Data CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// API token
    #[arg(long, env = "CARAPI_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// API secret
    #[arg(long, env = "CARAPI_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Host override (defaults to the production host of the chosen family)
    #[arg(long, env = "CARAPI_HOST")]
    host: Option<String>,

    /// Previously obtained JWT; skips the login while it is still valid
    #[arg(long, env = "CARAPI_JWT", hide_env_values = true)]
    jwt: Option<String>,

    /// API family
    #[arg(short, long, value_enum, default_value = "vehicles")]
    family: Family,

    /// API version: v1 or v2
    #[arg(long)]
    api_version: Option<ApiVersion>,

    /// Accept compressed responses (gzip, deflate); may be repeated
    #[arg(long = "encoding", value_name = "ENCODING")]
    encoding: Vec<Encoding>,

    /// Query parameter; may be repeated
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Search filter sent as the `json` parameter; may be repeated
    #[arg(long = "filter", value_name = "FIELD,OP[,VALUE]", value_parser = parse_filter)]
    filters: Vec<JsonSearchItem>,

    /// Configuration file path
    #[arg(short, long, env = "CARAPI_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the JWT with its expiry
    Auth,

    /// List model years
    Years,

    /// List makes
    Makes,

    /// List models
    Models,

    /// List submodels (OEM)
    Submodels,

    /// List trims
    Trims,

    /// List bodies
    Bodies,

    /// List engines
    Engines,

    /// List mileages
    Mileages,

    /// List interior colors
    InteriorColors,

    /// List exterior colors
    ExteriorColors,

    /// Show a single trim
    Trim {
        /// Trim ID
        id: u64,
    },

    /// Show a single submodel (OEM)
    Submodel {
        /// Submodel ID
        id: u64,
    },

    /// Decode a VIN
    Vin {
        /// Vehicle identification number
        vin: String,
    },

    /// Look up a license plate
    Plate {
        /// Country code, e.g. US
        country_code: String,

        /// Plate number
        lookup: String,

        /// Region, e.g. a US state
        #[arg(long)]
        region: Option<String>,
    },

    /// List OBD-II codes, or show one
    Obd {
        /// OBD-II code, e.g. B1200
        code: Option<String>,
    },

    /// List the values of a vehicle attribute
    Attributes {
        /// Attribute name, e.g. bodies.type
        attribute: String,
    },

    /// Show API usage
    Account {
        /// Only today's requests
        #[arg(long)]
        today: bool,
    },

    /// Show when the CSV data feed was last updated
    FeedUpdated,

    /// Download the CSV data feed
    Feed {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn resource(&self) -> Option<Resource> {
        Some(match self {
            Commands::Years => Resource::Years,
            Commands::Makes => Resource::Makes,
            Commands::Models => Resource::Models,
            Commands::Submodels => Resource::Submodels,
            Commands::Trims => Resource::Trims,
            Commands::Bodies => Resource::Bodies,
            Commands::Engines => Resource::Engines,
            Commands::Mileages => Resource::Mileages,
            Commands::InteriorColors => Resource::InteriorColors,
            Commands::ExteriorColors => Resource::ExteriorColors,
            _ => return None,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        token: cli.token.as_deref(),
        secret: cli.secret.as_deref(),
        host: cli.host.as_deref(),
        api_version: cli.api_version,
        encoding: &cli.encoding,
        compact: cli.compact,
        no_color: cli.no_color,
    });

    // Create output context
    let ctx = OutputContext::new(merged.compact, merged.no_color, cli.quiet);

    let mut sdk = Sdk::new(cli.family, merged.client_config()?)
        .context("Failed to create CarAPI client")?;

    if let Commands::Auth = cli.command {
        return commands::auth(&mut sdk, &ctx).await;
    }

    commands::ensure_jwt(&mut sdk, cli.jwt.as_deref(), &ctx).await?;

    let query = build_query(&cli.params, &cli.filters);

    // Execute command
    if let Some(resource) = cli.command.resource() {
        return commands::list(&sdk, resource, query, &ctx).await;
    }

    match &cli.command {
        Commands::Trim { id } => commands::trim(&sdk, *id, &ctx).await?,

        Commands::Submodel { id } => commands::submodel(&sdk, *id, &ctx).await?,

        Commands::Vin { vin } => commands::vin(&sdk, vin, query, &ctx).await?,

        Commands::Plate {
            country_code,
            lookup,
            region,
        } => {
            commands::plate(&sdk, country_code, lookup, region.as_deref(), query, &ctx).await?;
        }

        Commands::Obd { code } => commands::obd(&sdk, code.as_deref(), query, &ctx).await?,

        Commands::Attributes { attribute } => commands::attributes(&sdk, attribute, &ctx).await?,

        Commands::Account { today } => commands::account(&sdk, *today, query, &ctx).await?,

        Commands::FeedUpdated => commands::feed_updated(&sdk, &ctx).await?,

        Commands::Feed { output } => commands::feed(&sdk, output.as_deref(), &ctx).await?,

        // Handled above
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plate_with_params() {
        let cli = Cli::try_parse_from([
            "carapi-cli",
            "--token",
            "t",
            "--secret",
            "s",
            "--param",
            "verbose=yes",
            "--filter",
            "make,=,Tesla",
            "--encoding",
            "gzip",
            "plate",
            "US",
            "LNP8460",
            "--region",
            "NY",
        ])
        .unwrap();

        assert_eq!(cli.family, Family::Vehicles);
        assert_eq!(cli.params, vec![("verbose".to_string(), "yes".to_string())]);
        assert_eq!(cli.filters.len(), 1);
        assert_eq!(cli.encoding, vec![Encoding::Gzip]);
        assert!(matches!(
            cli.command,
            Commands::Plate { ref region, .. } if region.as_deref() == Some("NY")
        ));
    }

    #[test]
    fn test_parse_family_and_resource() {
        let cli = Cli::try_parse_from(["carapi-cli", "--family", "oem", "submodels"]).unwrap();
        assert_eq!(cli.family, Family::Oem);
        assert_eq!(cli.command.resource(), Some(Resource::Submodels));

        let cli = Cli::try_parse_from(["carapi-cli", "interior-colors"]).unwrap();
        assert_eq!(cli.command.resource(), Some(Resource::InteriorColors));

        let cli = Cli::try_parse_from(["carapi-cli", "feed-updated"]).unwrap();
        assert_eq!(cli.command.resource(), None);
    }

    #[test]
    fn test_rejects_bad_filter() {
        assert!(Cli::try_parse_from(["carapi-cli", "--filter", "make", "makes"]).is_err());
    }
}
