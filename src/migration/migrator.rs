use crate::backup::{ApiError, ApiResponse, BackupRestoreApi, PayloadBuilder};
use crate::migration::input::{parse_raw_line, MigrationRequest};
use crate::storage::{CustomerDirectory, CustomerId, TenantId};
use crate::utils::Metrics;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },
    #[error("failed to read input file {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Kein Eintrag bzw. keine CustomerID
    Unresolved { tenant: TenantId },
    /// Lookup selbst ist fehlgeschlagen, z.B. wegen Credentials oder Netzwerk
    LookupFailed { tenant: TenantId },
}

/// Ergebnis einer Zeile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Skipped(SkipReason),
    BackupFailed,
    BackupRejected,
    RestoreFailed,
    Restored,
}

impl PairOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            PairOutcome::Skipped(SkipReason::Unresolved { .. }) => "skipped_unresolved",
            PairOutcome::Skipped(SkipReason::LookupFailed { .. }) => "skipped_lookup_failed",
            PairOutcome::BackupFailed => "backup_failed",
            PairOutcome::BackupRejected => "backup_rejected",
            PairOutcome::RestoreFailed => "restore_failed",
            PairOutcome::Restored => "restored",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub skipped_unresolved: usize,
    pub skipped_lookup_failed: usize,
    pub backup_failed: usize,
    pub backup_rejected: usize,
    pub restore_failed: usize,
    pub restored: usize,
    pub malformed_lines: usize,
}

impl MigrationSummary {
    pub fn record(&mut self, outcome: &PairOutcome) {
        let counter = match outcome {
            PairOutcome::Skipped(SkipReason::Unresolved { .. }) => &mut self.skipped_unresolved,
            PairOutcome::Skipped(SkipReason::LookupFailed { .. }) => &mut self.skipped_lookup_failed,
            PairOutcome::BackupFailed => &mut self.backup_failed,
            PairOutcome::BackupRejected => &mut self.backup_rejected,
            PairOutcome::RestoreFailed => &mut self.restore_failed,
            PairOutcome::Restored => &mut self.restored,
        };
        *counter += 1;
    }

    pub fn pairs(&self) -> usize {
        self.skipped_unresolved
            + self.skipped_lookup_failed
            + self.backup_failed
            + self.backup_rejected
            + self.restore_failed
            + self.restored
    }
}

enum Resolution {
    Found(CustomerId),
    NotFound,
    Failed,
}

/// Sequenzielle Backup → Restore Migration
pub struct Migrator<D, A> {
    directory: D,
    api: A,
    payloads: PayloadBuilder,
    metrics: Arc<Metrics>,
}

impl<D, A> Migrator<D, A>
where
    D: CustomerDirectory,
    A: BackupRestoreApi,
{
    pub fn new(directory: D, api: A, payloads: PayloadBuilder, metrics: Arc<Metrics>) -> Self {
        Self {
            directory,
            api,
            payloads,
            metrics,
        }
    }

    /// Verarbeite die Input-Datei Zeile für Zeile
    pub async fn run(&self, path: &Path) -> Result<MigrationSummary, MigrationError> {
        let file = File::open(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                MigrationError::InputNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                MigrationError::Input {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        tracing::info!(path = %path.display(), "Starting migration");

        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut summary = MigrationSummary::default();
        let mut line_no = 0;

        // Zeilen als Bytes lesen, UTF-8 Decoding erfolgt pro Zeile
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| MigrationError::Input {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }

            line_no += 1;
            match parse_raw_line(line_no, &buf) {
                Ok(Some(request)) => {
                    let outcome = self.migrate_pair(&request).await;
                    self.metrics
                        .pairs_total
                        .with_label_values(&[outcome.label()])
                        .inc();
                    summary.record(&outcome);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed line");
                    self.metrics.malformed_lines.inc();
                    summary.malformed_lines += 1;
                }
            }
        }

        tracing::info!(
            pairs = summary.pairs(),
            restored = summary.restored,
            skipped_unresolved = summary.skipped_unresolved,
            skipped_lookup_failed = summary.skipped_lookup_failed,
            backup_failed = summary.backup_failed,
            backup_rejected = summary.backup_rejected,
            restore_failed = summary.restore_failed,
            malformed_lines = summary.malformed_lines,
            "Migration finished"
        );

        Ok(summary)
    }

    /// Resolve → Backup → Restore für ein Paar
    pub async fn migrate_pair(&self, request: &MigrationRequest) -> PairOutcome {
        let source = self.resolve(&request.source).await;
        let destination = self.resolve(&request.destination).await;

        for (tenant, resolution) in [(request.source, &source), (request.destination, &destination)] {
            let reason = match resolution {
                Resolution::Found(_) => continue,
                Resolution::NotFound => SkipReason::Unresolved { tenant },
                Resolution::Failed => SkipReason::LookupFailed { tenant },
            };
            tracing::info!(
                line = request.line,
                source = %request.source,
                destination = %request.destination,
                tenant = %tenant,
                reason = ?reason,
                "Skipping pair"
            );
            return PairOutcome::Skipped(reason);
        }

        let backup_params = self.payloads.backup_to_target(request);
        let response = match self.api.backup(&backup_params).await {
            Ok(response) => response.with_echo(request.source, request.destination),
            Err(e) => {
                tracing::error!(
                    line = request.line,
                    source = %request.source,
                    destination = %request.destination,
                    error = %e,
                    "Backup request failed"
                );
                return PairOutcome::BackupFailed;
            }
        };
        tracing::info!(line = request.line, result = %response.to_log_string(), "Backup finished");

        if response.reports_exception() {
            tracing::warn!(line = request.line, "Backup reported an exception, skipping restore");
            return PairOutcome::BackupRejected;
        }

        tracing::info!(line = request.line, "Starting restore");
        let restore_params = self.payloads.restore_from_target(request);
        match self.api.restore(&restore_params).await {
            Ok(response) => {
                tracing::info!(line = request.line, result = %response.to_log_string(), "Restore finished");
                if response.has_exception_marker() {
                    PairOutcome::RestoreFailed
                } else {
                    PairOutcome::Restored
                }
            }
            Err(e) => {
                tracing::error!(line = request.line, error = %e, "Restore request failed");
                PairOutcome::RestoreFailed
            }
        }
    }

    /// Einzelnes Tagesbackup eines Tenants in seinen Customer Prefix
    pub async fn backup_tenant(
        &self,
        tenant: &TenantId,
        today: NaiveDate,
    ) -> Result<ApiResponse, ApiError> {
        let customer = match self.resolve(tenant).await {
            Resolution::Found(customer) => Some(customer),
            Resolution::NotFound | Resolution::Failed => None,
        };

        let params = self.payloads.self_backup(tenant, customer.as_ref(), today);
        tracing::info!(tenant = %tenant, s3_path = %params.s3_path, "Starting backup");

        let response = self.api.backup(&params).await?;
        tracing::info!(result = %response.to_log_string(), "Backup finished");
        Ok(response)
    }

    async fn resolve(&self, tenant: &TenantId) -> Resolution {
        match self.directory.customer_id(tenant).await {
            Ok(Some(customer)) => {
                tracing::debug!(tenant = %tenant, customer = %customer, "Customer id resolved");
                Resolution::Found(customer)
            }
            Ok(None) => {
                tracing::info!(tenant = %tenant, "No customer id for tenant");
                Resolution::NotFound
            }
            Err(e) => {
                tracing::warn!(tenant = %tenant, error = %e, "Customer id lookup failed");
                Resolution::Failed
            }
        }
    }
}
