mod backup;
mod cli;
mod migration;
mod storage;
mod utils;


use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::cli::{Cli, Command};
use crate::migration::{MigrationError, Migrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    utils::init_logging();

    let mut config = utils::Config::from_env()?;
    config.api_base_url = cli.base_url.clone();

    let metrics = Arc::new(utils::Metrics::new());

    let directory = storage::DynamoDbDirectory::new(&config).await;
    let client = backup::BackupRestoreClient::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
        metrics.clone(),
    )?;
    let migrator = Migrator::new(
        directory,
        client,
        backup::PayloadBuilder::new(&config),
        metrics.clone(),
    );

    let span = tracing::info_span!("run", run_id = %uuid::Uuid::new_v4());
    match cli.command() {
        Command::Migrate { input } => match migrator.run(&input).instrument(span).await {
            Ok(_) => {}
            Err(MigrationError::InputNotFound { path }) => {
                tracing::error!(path = %path.display(), "Input file not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "Migration aborted");
            }
        },
        Command::Backup { tenant } => {
            let today = chrono::Local::now().date_naive();
            if let Err(e) = migrator.backup_tenant(&tenant, today).instrument(span).await {
                tracing::error!(tenant = %tenant, error = %e, "Backup request failed");
            }
        }
    }

    if let Some(path) = &cli.metrics_file {
        if let Err(e) = metrics.write_to(path) {
            tracing::warn!(error = %e, "Failed to write metrics");
        }
    }

    Ok(())
}
