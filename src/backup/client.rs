use crate::backup::models::{ApiResponse, BackupParams, RestoreParams};
use crate::utils::Metrics;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error occurred: {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    fn metric_label(&self) -> &'static str {
        match self {
            ApiError::Status { .. } => "http_error",
            ApiError::Transport { .. } => "transport_error",
            ApiError::Decode { .. } => "decode_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Backup,
    Restore,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Backup => "backup",
            Endpoint::Restore => "restore",
        }
    }
}

/// Remote Backup/Restore API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupRestoreApi: Send + Sync {
    async fn backup(&self, params: &BackupParams) -> Result<ApiResponse, ApiError>;
    async fn restore(&self, params: &RestoreParams) -> Result<ApiResponse, ApiError>;
}

/// HTTP Client für `{base_url}/backup` und `{base_url}/restore`
pub struct BackupRestoreClient {
    base_url: String,
    client: reqwest::Client,
    metrics: Arc<Metrics>,
}

impl BackupRestoreClient {
    /// Erstelle neuen Client, `timeout` gilt pro Request
    pub fn new(base_url: &str, timeout: Duration, metrics: Arc<Metrics>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            metrics,
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.as_str())
    }

    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: Endpoint,
        body: &T,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(%url, "Sending request");

        let timer = self
            .metrics
            .api_latency
            .with_label_values(&[endpoint.as_str()])
            .start_timer();
        let result = self.send(&url, body).await;
        timer.observe_duration();

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.metric_label(),
        };
        self.metrics
            .api_request_count
            .with_label_values(&[endpoint.as_str(), status])
            .inc();

        result
    }

    async fn send<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<ApiResponse, ApiError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body: text });
        }

        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl BackupRestoreApi for BackupRestoreClient {
    async fn backup(&self, params: &BackupParams) -> Result<ApiResponse, ApiError> {
        self.post(Endpoint::Backup, params).await
    }

    async fn restore(&self, params: &RestoreParams) -> Result<ApiResponse, ApiError> {
        self.post(Endpoint::Restore, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(base_url: &str) -> (BackupRestoreClient, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let client = BackupRestoreClient::new(base_url, Duration::from_secs(5), metrics.clone())
            .expect("Failed to create client");
        (client, metrics)
    }

    fn backup_params() -> BackupParams {
        BackupParams {
            src_uri: "mongodb://source:27017".to_string(),
            src_db: "1000123_DB".to_string(),
            src_addition: vec!["replicaSet=rs0".to_string()],
            file_type: "gz".to_string(),
            s3_bucket: "test-bucket".to_string(),
            s3_path: "1000234/1000123_backup".to_string(),
        }
    }

    #[test]
    fn test_endpoint_url_ignores_trailing_slash() {
        let (client, _) = client("http://localhost:8888/");
        assert_eq!(client.endpoint_url(Endpoint::Backup), "http://localhost:8888/backup");
        assert_eq!(client.endpoint_url(Endpoint::Restore), "http://localhost:8888/restore");
    }

    #[tokio::test]
    async fn test_backup_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/backup")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "src_db": "1000123_DB",
                "s3_path": "1000234/1000123_backup",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "backup completed", "elapsed": 12}"#)
            .create_async()
            .await;

        let (client, metrics) = client(&format!("{}/", server.url()));
        let response = client.backup(&backup_params()).await.expect("backup failed");

        mock.assert_async().await;
        assert_eq!(response.message.as_deref(), Some("backup completed"));
        assert_eq!(response.extra.get("elapsed"), Some(&json!(12)));
        assert_eq!(
            metrics
                .api_request_count
                .with_label_values(&["backup", "success"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_restore_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/restore")
            .match_body(Matcher::PartialJson(json!({"dst_db": "1000234_DB"})))
            .with_status(200)
            .with_body(r#"{"message": "restore completed"}"#)
            .create_async()
            .await;

        let (client, _) = client(&server.url());
        let params = RestoreParams {
            dst_uri: "mongodb://target:27017".to_string(),
            dst_db: "1000234_DB".to_string(),
            dst_addition: vec!["authSource=admin".to_string()],
            s3_bucket: "test-bucket".to_string(),
            s3_key: "1000234/1000123_backup/1000123_DB.gz".to_string(),
        };
        let response = client.restore(&params).await.expect("restore failed");

        mock.assert_async().await;
        assert_eq!(response.message.as_deref(), Some("restore completed"));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/backup")
            .with_status(500)
            .with_body("mongodump failed")
            .create_async()
            .await;

        let (client, metrics) = client(&server.url());
        match client.backup(&backup_params()).await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "mongodump failed");
            }
            other => panic!("expected status error, got {:?}", other),
        }
        assert_eq!(
            metrics
                .api_request_count
                .with_label_values(&["backup", "http_error"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/backup")
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let (client, _) = client(&server.url());
        let result = client.backup(&backup_params()).await;
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) ist lokal praktisch nie offen
        let (client, _) = client("http://127.0.0.1:9");
        let result = client.backup(&backup_params()).await;
        assert!(matches!(result, Err(ApiError::Transport { .. })));
    }
}
