use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Marker im `message` Feld einer fehlgeschlagenen Backup Response
pub const EXCEPTION_MARKER: &str = "Exception";

/// POST /backup Request Body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupParams {
    pub src_uri: String,
    pub src_db: String,
    pub src_addition: Vec<String>,
    pub file_type: String,
    pub s3_bucket: String,
    pub s3_path: String,
}

/// POST /restore Request Body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreParams {
    pub dst_uri: String,
    pub dst_db: String,
    pub dst_addition: Vec<String>,
    pub s3_bucket: String,
    pub s3_key: String,
}

/// Response der Backup/Restore API
///
/// Nur `message` wird ausgewertet, alle anderen Felder bleiben für das Logging erhalten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiResponse {
    /// Ergänze ClientID/TargetID für das Ergebnis-Logging
    pub fn with_echo(mut self, client_id: impl ToString, target_id: impl ToString) -> Self {
        self.extra
            .insert("ClientID".to_string(), Value::String(client_id.to_string()));
        self.extra
            .insert("TargetID".to_string(), Value::String(target_id.to_string()));
        self
    }

    pub fn has_exception_marker(&self) -> bool {
        self.message
            .as_deref()
            .is_some_and(|message| message.contains(EXCEPTION_MARKER))
    }

    /// Backup gilt nur mit vorhandener `message` ohne Exception Marker als erfolgreich
    pub fn reports_exception(&self) -> bool {
        self.message.is_none() || self.has_exception_marker()
    }

    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}
