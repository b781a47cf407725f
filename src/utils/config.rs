use anyhow::{Context, Result};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8888";
pub const DEFAULT_INPUT_PATH: &str = "task_list";

/// Hauptkonfiguration für den Migrationslauf
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Timeout pro Backup/Restore Request in Sekunden
    pub request_timeout_secs: u64,
    pub aws_region: Option<String>,
    pub dynamodb_table: String,
    /// Optionaler Endpoint, z.B. DynamoDB Local
    pub dynamodb_endpoint: Option<String>,
    pub source_uri: String,
    pub source_options: Vec<String>,
    pub target_uri: String,
    pub target_options: Vec<String>,
    pub s3_bucket: String,
    pub file_type: String,
}

impl Config {
    /// Lade Config aus Environment Variablen
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lade Config über eine beliebige Key → Value Quelle
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            api_base_url: var("BACKUP_API_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: var("BACKUP_API_TIMEOUT_SECS")
                .unwrap_or_else(|| "3600".to_string())
                .parse()
                .context("BACKUP_API_TIMEOUT_SECS must be a number of seconds")?,
            aws_region: var("AWS_REGION"),
            dynamodb_table: var("DYNAMODB_TABLE").unwrap_or_else(|| "Client_Info".to_string()),
            dynamodb_endpoint: var("DYNAMODB_ENDPOINT"),
            source_uri: var("SOURCE_DOCDB_URI")
                .context("SOURCE_DOCDB_URI not set")?,
            source_options: split_options(
                &var("SOURCE_DOCDB_OPTIONS").unwrap_or_else(|| {
                    "replicaSet=rs0&readPreference=secondaryPreferred&retryWrites=false"
                        .to_string()
                }),
            ),
            target_uri: var("TARGET_DOCDB_URI")
                .context("TARGET_DOCDB_URI not set")?,
            target_options: split_options(
                &var("TARGET_DOCDB_OPTIONS").unwrap_or_else(|| "authSource=admin".to_string()),
            ),
            s3_bucket: var("BACKUP_S3_BUCKET")
                .unwrap_or_else(|| "passer-cloud-customerdata".to_string()),
            file_type: var("BACKUP_FILE_TYPE").unwrap_or_else(|| "gz".to_string()),
        })
    }
}

/// `;`-getrennte Connection Options, leere Einträge werden verworfen
fn split_options(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
