mod cocktaildb;
mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::process;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cocktaildb::CocktailDbClient;
use crate::commands::{
    App, cmd_cache, cmd_favorite, cmd_favorites, cmd_login, cmd_logout, cmd_offline, cmd_random,
    cmd_register, cmd_save, cmd_search, cmd_show, cmd_unsave, cmd_whoami,
};
use crate::config::Config;
use cocktails_core::db::Database;
use cocktails_core::identity::LocalIdentity;
use cocktails_core::repository::SyncRepository;
use cocktails_core::service::DEFAULT_RANDOM_COUNT;

#[derive(Parser)]
#[command(
    name = "cocktails",
    version,
    about = "A local-first cocktail recipe catalogue",
    long_about = "Browse TheCocktailDB, keep favorites, and save recipes for offline use.\n\n\
                  Favorites and offline recipes are stored per signed-in user."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a handful of random cocktails
    Random {
        /// Number of recipes to fetch
        #[arg(short = 'n', long, default_value_t = DEFAULT_RANDOM_COUNT)]
        count: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search cocktails by name (an empty query shows random ones)
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with ingredients and instructions
    Show {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a recipe as favorite (favorites are also saved offline)
    Favorite {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a recipe for offline use
    Save {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from offline recipes
    Unsave {
        /// Recipe ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your favorite recipes
    Favorites {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your offline recipes
    Offline {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Debug: dump every cached recipe row, for all users
    #[command(hide = true)]
    Cache {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an account and sign in
    Register {
        /// Email address
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign in to an existing account
    Login {
        /// Email address
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign out
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn build_app(config: &Config) -> Result<App> {
    let client = CocktailDbClient::new(&config.api_base_url)?;
    let repository = SyncRepository::new(Database::open(&config.db_path)?, client);
    let identity = LocalIdentity::new(Database::open(&config.db_path)?);
    Ok(App::new(repository, identity))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    debug!(db_path = %config.db_path.display(), api = %config.api_base_url, "Config loaded");
    let app = build_app(&config)?;

    match cli.command {
        Commands::Random { count, json } => cmd_random(&app, count, json).await,
        Commands::Search { query, json } => cmd_search(&app, &query, json).await,
        Commands::Show { id, json } => cmd_show(&app, &id, json).await,
        Commands::Favorite { id, json } => cmd_favorite(&app, &id, json).await,
        Commands::Save { id, json } => cmd_save(&app, &id, json).await,
        Commands::Unsave { id, json } => cmd_unsave(&app, &id, json),
        Commands::Favorites { json } => cmd_favorites(&app, json),
        Commands::Offline { json } => cmd_offline(&app, json),
        Commands::Cache { json } => cmd_cache(&app, json),
        Commands::Register {
            email,
            password,
            json,
        } => cmd_register(&app, &email, password, json).await,
        Commands::Login {
            email,
            password,
            json,
        } => cmd_login(&app, &email, password, json).await,
        Commands::Logout { json } => cmd_logout(&app, json),
        Commands::Whoami { json } => cmd_whoami(&app, json),
    }
}
