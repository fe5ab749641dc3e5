//! ruidos - command line for the portfolio's local content store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ruidos::auth::{password_digest, PasswordGate};
use ruidos::backoffice::Backoffice;
use ruidos::catalog::{render_signal, Catalog};
use ruidos::config::Config;
use ruidos::db::{Collection, LocalStore};
use ruidos::editor::normalize_embed;
use ruidos::{seed, transfer};

/// ruidos - local content store for ruídos atmosféricos
#[derive(Parser, Debug)]
#[command(name = "ruidos")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the store file (overrides RUIDOS_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync the seed dataset into the store
    Seed {
        /// Apply even when the store already holds this version
        #[arg(long)]
        force: bool,
    },

    /// Dump all collections to a JSON file
    Export { path: PathBuf },

    /// Upsert every record of an export file
    Import { path: PathBuf },

    /// List visible works, newest first
    Works,

    /// List published signals, newest first
    Signals,

    /// Render a published signal as HTML
    Show { id: String },

    /// Print the canonical embed URL for a pasted link
    Embed { link: String },

    /// Print the hex digest to configure as RUIDOS_ADMIN_DIGEST
    Digest { password: String },

    /// Publish a signal
    Publish {
        id: String,
        #[arg(long)]
        password: String,
    },

    /// Delete a work
    DeleteWork {
        id: String,
        #[arg(long)]
        password: String,
    },

    /// Delete a signal
    DeleteSignal {
        id: String,
        #[arg(long)]
        password: String,
    },

    /// Show record counts and sensor metrics
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Commands that never touch the store
    match &cli.command {
        Commands::Embed { link } => {
            println!("{}", normalize_embed(link)?.url);
            return Ok(());
        }
        Commands::Digest { password } => {
            println!("{}", password_digest(password));
            return Ok(());
        }
        _ => {}
    }

    tracing::debug!("Database path: {:?}", config.db_path);
    let store = LocalStore::open(&config.db_path).await?;

    // Every start brings the store up to the bundled dataset
    let dataset = seed::load(config.seed_path.as_deref()).await?;
    if !matches!(cli.command, Commands::Seed { .. }) {
        seed::sync(&store, &dataset, false).await?;
    }

    let catalog = Catalog::new(store.clone());

    match cli.command {
        Commands::Seed { force } => {
            let outcome = seed::sync(&store, &dataset, force).await?;
            println!("{:?}", outcome);
        }
        Commands::Export { path } => {
            let bundle = transfer::export_to_path(&store, &path).await?;
            println!(
                "exported {} works, {} signals, {} about records to {}",
                bundle.works.len(),
                bundle.signals.len(),
                bundle.about.len(),
                path.display()
            );
        }
        Commands::Import { path } => {
            let summary = transfer::import_from_path(&store, &path).await?;
            println!(
                "imported {} works, {} signals, {} about records ({} skipped)",
                summary.works, summary.signals, summary.about, summary.skipped
            );
        }
        Commands::Works => {
            for work in catalog.visible_works().await {
                let marker = if work.is_featured { "*" } else { " " };
                println!("{} {}  {}  {}", marker, work.date, work.id, work.title);
            }
        }
        Commands::Signals => {
            for signal in catalog.published_signals().await {
                println!("{}  {}  {}", signal.date, signal.id, signal.title);
            }
        }
        Commands::Show { id } => match catalog.open_signal(&id).await {
            Some((signal, counted)) => {
                println!("{}", render_signal(&signal));
                counted.await?;
            }
            None => return Err(format!("no published signal {}", id).into()),
        },
        Commands::Publish { id, password } => {
            let backoffice = unlock(&store, &config, &password)?;
            let mut session = backoffice.edit_signal(&id).await?;
            session.publish(&store).await?;
            println!("published {} ({})", id, session.signal().date);
        }
        Commands::DeleteWork { id, password } => {
            unlock(&store, &config, &password)?.delete_work(&id).await?;
            println!("deleted work {}", id);
        }
        Commands::DeleteSignal { id, password } => {
            unlock(&store, &config, &password)?.delete_signal(&id).await?;
            println!("deleted signal {}", id);
        }
        Commands::Stats => {
            for collection in Collection::ALL {
                println!("{}: {}", collection, store.count(collection).await?);
            }
            let sensor = catalog.sensor_data().await;
            println!("visits: {}  clicks: {}", sensor.visits, sensor.clicks);
            if let Some(synced) = store.last_synced().await? {
                println!("last synced: {}", synced.to_rfc3339());
            }
        }
        Commands::Embed { .. } | Commands::Digest { .. } => {}
    }

    Ok(())
}

/// Pass the password gate and open the backoffice.
fn unlock(
    store: &LocalStore,
    config: &Config,
    password: &str,
) -> Result<Backoffice, ruidos::AppError> {
    let gate = PasswordGate::from_hex(&config.admin_digest)?;
    let access = gate.unlock(password)?;
    Ok(Backoffice::new(store.clone(), config.editor.clone(), access))
}
