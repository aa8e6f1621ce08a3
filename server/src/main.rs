use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use tracing::info;

use server::{
    config::AppConfig,
    http::{self, AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "deal-tracker-server", version, about = "TA Deal Tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the REST API server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

/// Connect, apply the schema, then serve. Any failure here exits the
/// process instead of serving half-initialized.
async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    let state = AppState {
        pool: Arc::new(pool),
        config,
    };
    http::serve((&cmd).into(), state).await
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}
