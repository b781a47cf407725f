use crate::storage::TenantId;
use crate::utils::config::{DEFAULT_API_BASE_URL, DEFAULT_INPUT_PATH};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Migriert Tenant-Datenbanken über die Backup/Restore API
#[derive(Debug, Parser)]
#[command(name = "docdb-migrate", version, about)]
pub struct Cli {
    /// Base URL der Backup/Restore API
    #[arg(long, global = true, env = "BACKUP_API_URL", default_value = DEFAULT_API_BASE_URL)]
    pub base_url: String,

    /// Prometheus Metrics nach dem Lauf in diese Datei schreiben
    #[arg(long, global = true)]
    pub metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Backup + Restore für jede `source,destination` Zeile der Input-Datei
    Migrate {
        #[arg(env = "MIGRATION_INPUT", default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,
    },
    /// Tagesbackup eines einzelnen Tenants
    Backup { tenant: TenantId },
}

impl Cli {
    /// Ohne Subcommand wird `migrate` mit Default-Input ausgeführt
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_else(|| Command::Migrate {
            input: std::env::var("MIGRATION_INPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_INPUT_PATH)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_subcommand() {
        let cli = Cli::try_parse_from(["docdb-migrate", "backup", "1000740"]).unwrap();
        match cli.command() {
            Command::Backup { tenant } => assert_eq!(tenant, TenantId::new(1000740)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_migrate_with_input_and_base_url() {
        let cli = Cli::try_parse_from([
            "docdb-migrate",
            "migrate",
            "/tmp/task_list3",
            "--base-url",
            "http://backup.internal:8888/",
        ])
        .unwrap();

        assert_eq!(cli.base_url, "http://backup.internal:8888/");
        match cli.command() {
            Command::Migrate { input } => assert_eq!(input, PathBuf::from("/tmp/task_list3")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_tenant_rejected() {
        assert!(Cli::try_parse_from(["docdb-migrate", "backup", "abc"]).is_err());
    }
}
