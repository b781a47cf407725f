use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::path::Path;

/// Prometheus Metrics für einen Migrationslauf
pub struct Metrics {
    pub registry: Registry,
    pub pairs_total: IntCounterVec,
    pub malformed_lines: IntCounter,
    pub api_request_count: IntCounterVec,
    pub api_latency: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let pairs_total = IntCounterVec::new(
            Opts::new("migration_pairs_total", "Processed migration pairs by outcome"),
            &["outcome"],
        )
        .expect("Failed to create pairs_total metric");

        let malformed_lines = IntCounter::new(
            "migration_malformed_lines_total",
            "Input lines that could not be parsed",
        )
        .expect("Failed to create malformed_lines metric");

        let api_request_count = IntCounterVec::new(
            Opts::new("backup_api_requests_total", "Backup/restore API requests"),
            &["endpoint", "status"],
        )
        .expect("Failed to create api_request_count metric");

        // Backups laufen bis zu einer Stunde
        let api_latency = HistogramVec::new(
            HistogramOpts::new(
                "backup_api_request_duration_seconds",
                "Backup/restore API latency in seconds",
            )
            .buckets(vec![1.0, 10.0, 60.0, 300.0, 900.0, 1800.0, 3600.0]),
            &["endpoint"],
        )
        .expect("Failed to create api_latency metric");

        registry.register(Box::new(pairs_total.clone())).ok();
        registry.register(Box::new(malformed_lines.clone())).ok();
        registry.register(Box::new(api_request_count.clone())).ok();
        registry.register(Box::new(api_latency.clone())).ok();

        Self {
            registry,
            pairs_total,
            malformed_lines,
            api_request_count,
            api_latency,
        }
    }

    /// Text Exposition Format (z.B. für den node_exporter textfile collector)
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()?)?;
        tracing::info!(path = %path.display(), "Metrics written");
        Ok(())
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
