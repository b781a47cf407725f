use crate::backup::models::{BackupParams, RestoreParams};
use crate::migration::MigrationRequest;
use crate::storage::{CustomerId, TenantId};
use crate::utils::Config;
use chrono::NaiveDate;

/// Baut Request Bodies für Backup und Restore
///
/// Alle Methoden sind pure Funktionen über Config und IDs, es findet kein Lookup statt.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    source_uri: String,
    source_options: Vec<String>,
    target_uri: String,
    target_options: Vec<String>,
    s3_bucket: String,
    file_type: String,
}

impl PayloadBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            source_uri: config.source_uri.clone(),
            source_options: config.source_options.clone(),
            target_uri: config.target_uri.clone(),
            target_options: config.target_options.clone(),
            s3_bucket: config.s3_bucket.clone(),
            file_type: config.file_type.clone(),
        }
    }

    /// Backup der Quell-DB in den Prefix des Ziel-Tenants
    pub fn backup_to_target(&self, request: &MigrationRequest) -> BackupParams {
        BackupParams {
            src_uri: self.source_uri.clone(),
            src_db: database_name(&request.source),
            src_addition: self.source_options.clone(),
            file_type: self.file_type.clone(),
            s3_bucket: self.s3_bucket.clone(),
            s3_path: backup_prefix(&request.source, &request.destination),
        }
    }

    /// Restore des mit `backup_to_target` geschriebenen Dumps in die Ziel-DB
    pub fn restore_from_target(&self, request: &MigrationRequest) -> RestoreParams {
        RestoreParams {
            dst_uri: self.target_uri.clone(),
            dst_db: database_name(&request.destination),
            dst_addition: self.target_options.clone(),
            s3_bucket: self.s3_bucket.clone(),
            s3_key: format!(
                "{}/{}.{}",
                backup_prefix(&request.source, &request.destination),
                database_name(&request.source),
                self.file_type
            ),
        }
    }

    /// Tagesbackup eines Tenants in den eigenen Customer Prefix
    pub fn self_backup(
        &self,
        tenant: &TenantId,
        customer: Option<&CustomerId>,
        today: NaiveDate,
    ) -> BackupParams {
        let prefix = match customer {
            Some(customer) => customer.to_string(),
            None => format!("no_data_for_{}", tenant),
        };

        BackupParams {
            src_uri: self.source_uri.clone(),
            src_db: database_name(tenant),
            src_addition: self.source_options.clone(),
            file_type: self.file_type.clone(),
            s3_bucket: self.s3_bucket.clone(),
            s3_path: format!("{}/{}_backup", prefix, today.format("%Y%m%d")),
        }
    }
}

fn database_name(tenant: &TenantId) -> String {
    format!("{}_DB", tenant)
}

fn backup_prefix(source: &TenantId, destination: &TenantId) -> String {
    format!("{}/{}_backup", destination, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_config;

    fn request() -> MigrationRequest {
        MigrationRequest {
            line: 1,
            source: TenantId::new(1000123),
            destination: TenantId::new(1000234),
        }
    }

    #[test]
    fn test_backup_to_target() {
        let builder = PayloadBuilder::new(&test_config());
        let params = builder.backup_to_target(&request());

        assert_eq!(params.src_db, "1000123_DB");
        assert_eq!(params.s3_path, "1000234/1000123_backup");
        assert_eq!(params.src_uri, "mongodb://source:27017");
        assert_eq!(params.file_type, "gz");
        assert_eq!(params.s3_bucket, "test-bucket");
        assert_eq!(
            params.src_addition,
            vec!["replicaSet=rs0&readPreference=secondaryPreferred&retryWrites=false".to_string()]
        );
    }

    #[test]
    fn test_restore_reads_backup_object() {
        let builder = PayloadBuilder::new(&test_config());
        let backup = builder.backup_to_target(&request());
        let restore = builder.restore_from_target(&request());

        assert_eq!(restore.dst_db, "1000234_DB");
        assert_eq!(restore.dst_uri, "mongodb://target:27017");
        assert_eq!(restore.dst_addition, vec!["authSource=admin".to_string()]);
        assert_eq!(restore.s3_key, "1000234/1000123_backup/1000123_DB.gz");
        assert!(restore.s3_key.starts_with(&backup.s3_path));
    }

    #[test]
    fn test_backup_serializes_wire_keys() {
        let builder = PayloadBuilder::new(&test_config());
        let value = serde_json::to_value(builder.backup_to_target(&request())).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["file_type", "s3_bucket", "s3_path", "src_addition", "src_db", "src_uri"]
        );
    }

    #[test]
    fn test_self_backup_paths() {
        let builder = PayloadBuilder::new(&test_config());
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let tenant = TenantId::new(1000740);

        let resolved = builder.self_backup(&tenant, Some(&CustomerId::new("C9")), today);
        assert_eq!(resolved.s3_path, "C9/20240309_backup");
        assert_eq!(resolved.src_db, "1000740_DB");

        let unresolved = builder.self_backup(&tenant, None, today);
        assert_eq!(unresolved.s3_path, "no_data_for_1000740/20240309_backup");
    }
}
