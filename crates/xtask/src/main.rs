// Operator chores for the storefront test suite
//
//   cargo xtask purge-user --email someone@test.com
//   cargo xtask show-config
//   cargo xtask smoke

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storefront_e2e::cleanup::try_delete_user_from_db;
use storefront_e2e::{SuiteConfig, api};

#[derive(Parser)]
#[command(name = "xtask", about = "Storefront test suite chores")]
struct Cli {
    /// Config file to use instead of STOREFRONT_E2E_CONFIG / test-data/suite.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Delete a user left behind by a failed scenario, straight from the database
    PurgeUser {
        #[arg(long)]
        email: String,
    },
    /// Print the effective configuration (secrets omitted)
    ShowConfig,
    /// Fetch product 1 to check the API is reachable
    Smoke,
}

fn load_config(path: Option<&PathBuf>) -> Result<SuiteConfig> {
    let config = match path {
        Some(path) => {
            let config = SuiteConfig::from_file(path)?
                .with_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            config
        }
        None => SuiteConfig::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    storefront_e2e::init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref()).context("loading suite configuration")?;

    match cli.command {
        Command::PurgeUser { email } => {
            let rows = try_delete_user_from_db(&config.database, &email)
                .await
                .with_context(|| format!("deleting {}", email))?;
            println!("deleted {} row(s) for {}", rows, email);
        }
        Command::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            println!(
                "api token: {}",
                if config.api.token.is_some() { "set" } else { "unset" }
            );
            println!(
                "fixture password: {}",
                if config.fixtures.existing_user.password.is_some() {
                    "set"
                } else {
                    "unset"
                }
            );
        }
        Command::Smoke => {
            let client = storefront_e2e::ApiClient::from_config(&config.api, config.timeouts.request())?;
            let product: api::Product = api::decode(api::get_product(&client, 1).await?)?;
            tracing::info!(base_url = client.base_url(), "API reachable");
            println!("product {}: {} ({})", product.id, product.name, product.price);
        }
    }

    Ok(())
}
