mod favorites;
mod search;
mod submit;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::favorites::FavoritesCommands;
use crate::submit::SubmitCommands;

#[derive(Debug, Parser)]
#[command(name = "cuppa")]
#[command(about = "Find coffee shops from a plain-language prompt")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search for cafés, e.g. `cuppa search "quiet cafe with wifi open after 9pm"`
    Search {
        prompt: String,

        /// Latitude of your position; defaults to `CUPPA_DEFAULT_LAT`
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of your position; defaults to `CUPPA_DEFAULT_LNG`
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Bearer token identifying you; lets the search store newly seen shops
        #[arg(long, env = "CUPPA_ACTOR_TOKEN", hide_env_values = true)]
        actor: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage locally saved favorite shops
    Favorites {
        /// Favorites file
        #[arg(long, env = "CUPPA_FAVORITES_PATH", default_value = "./favorites.json")]
        path: PathBuf,

        #[command(subcommand)]
        command: FavoritesCommands,
    },
    /// Report amenities or rate a shop
    Submit {
        /// Bearer token identifying you
        #[arg(long, env = "CUPPA_ACTOR_TOKEN", hide_env_values = true)]
        actor: String,

        #[command(subcommand)]
        command: SubmitCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

fn init_tracing() {
    let fallback = std::env::var("CUPPA_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(config: &cuppa_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = cuppa_db::PoolConfig::from_app_config(config);
    let pool = cuppa_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Search {
            prompt,
            lat,
            lng,
            actor,
            json,
        }) => {
            let config = cuppa_core::load_app_config()?;
            let pool = connect(&config).await?;
            search::run_search(&config, pool, &prompt, lat.zip(lng), actor.as_deref(), json)
                .await?;
        }
        Some(Commands::Favorites { path, command }) => {
            favorites::run_favorites(&path, command)?;
        }
        Some(Commands::Submit { actor, command }) => {
            let config = cuppa_core::load_app_config()?;
            let pool = connect(&config).await?;
            submit::run_submit(&pool, &actor, command).await?;
        }
        Some(Commands::Db { command }) => {
            let config = cuppa_core::load_app_config()?;
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    cuppa_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = cuppa_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        None => println!("cuppa: try `cuppa search \"cafe with wifi near me\"`"),
    }

    Ok(())
}
