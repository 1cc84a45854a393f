mod products;

use atelier_catalog::Catalog;
use atelier_store::MetaobjectClient;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::products::{CreateArgs, UpdateArgs};

#[derive(Debug, Parser)]
#[command(name = "atelier-cli")]
#[command(about = "Atelier catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print every catalog entry as JSON
    List,
    /// Print one catalog entry, looked up by handle or slug
    Get {
        #[arg(long, conflicts_with = "slug", required_unless_present = "slug")]
        handle: Option<String>,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Create a catalog entry and resolve its uploaded media
    Create(CreateArgs),
    /// Update selected fields of an existing entry
    Update(UpdateArgs),
    /// Delete an entry by store id
    Delete {
        #[arg(long)]
        id: String,
    },
    /// Re-poll unresolved media for an entry and persist what resolves
    RepairMedia {
        #[arg(long)]
        handle: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = atelier_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(config = ?config, "configuration loaded");

    let client = MetaobjectClient::from_config(&config)?;
    let catalog = Catalog::from_config(client, &config);

    match cli.command {
        Commands::List => products::run_list(&catalog).await,
        Commands::Get { handle, slug } => {
            products::run_get(&catalog, handle.as_deref(), slug.as_deref()).await
        }
        Commands::Create(args) => products::run_create(&catalog, args).await,
        Commands::Update(args) => products::run_update(&catalog, args).await,
        Commands::Delete { id } => products::run_delete(&catalog, &id).await,
        Commands::RepairMedia { handle } => products::run_repair_media(&catalog, &handle).await,
    }
}
