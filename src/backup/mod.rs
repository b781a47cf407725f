pub mod client;
pub mod models;
pub mod params;

pub use client::{ApiError, BackupRestoreApi, BackupRestoreClient, Endpoint};
pub use models::{ApiResponse, BackupParams, RestoreParams};
pub use params::PayloadBuilder;

#[cfg(test)]
pub use client::MockBackupRestoreApi;
