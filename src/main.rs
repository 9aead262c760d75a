use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use shoko::authz::PrincipalId;
use shoko::vault::Vault;
use shoko::{directory_sync, seed, settings, storage};

#[derive(Parser, Debug)]
#[command(
    name = "shoko",
    version,
    about = "Document and career-record archive administration"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply database migrations and exit
    Migrate,
    /// Create the demo organization if it does not exist
    SeedDemo,
    /// Sync departments, users and reporting lines from a JSON file
    SyncDirectory { file: std::path::PathBuf },
    /// List every direct and indirect report of a user
    Subordinates { user_id: PrincipalId },
    /// List the career records a user may view
    Career { user_id: PrincipalId },
    /// List the top-level folders shown to a user
    Folders { user_id: PrincipalId },
    /// Check whether a user may download a file
    CheckFile {
        user_id: PrincipalId,
        file_id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    // load settings
    let settings = settings::Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    // init storage (database + migrations)
    let db = storage::init(&settings.database).await?;

    if settings.directory.seed_demo {
        seed::seed_demo_data(&db).await?;
    }
    if let Some(path) = &settings.directory.sync_file {
        directory_sync::sync_directory_from_file(&db, path).await?;
    }

    let vault = Vault::new(db, settings.authz);

    match cli.command {
        Command::Migrate => {
            tracing::info!("Database schema is up to date");
        }
        Command::SeedDemo => {
            let created = seed::seed_demo_data(vault.db()).await?;
            print_json(&serde_json::json!({ "seeded": created }))?;
        }
        Command::SyncDirectory { file } => {
            let report = directory_sync::sync_directory_from_file(vault.db(), &file).await?;
            print_json(&report)?;
        }
        Command::Subordinates { user_id } => {
            vault.principal(user_id).await?;
            print_json(&vault.subordinates(user_id).await?)?;
        }
        Command::Career { user_id } => {
            let principal = vault.principal(user_id).await?;
            print_json(&vault.career_records(&principal).await?)?;
        }
        Command::Folders { user_id } => {
            let principal = vault.principal(user_id).await?;
            print_json(&vault.root_folders(&principal).await?)?;
        }
        Command::CheckFile { user_id, file_id } => {
            let principal = vault.principal(user_id).await?;
            let allowed = match vault.download_file(&principal, file_id).await {
                Ok(_) => true,
                Err(shoko::errors::ShokoError::Forbidden(_)) => false,
                Err(e) => return Err(e.into()),
            };
            print_json(&serde_json::json!({ "allowed": allowed }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}
