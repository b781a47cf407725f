use crate::storage::models::{CustomerId, TenantId};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Request an DynamoDB fehlgeschlagen (Netzwerk, Credentials oder fehlende Tabelle)
    #[error("lookup for tenant {tenant} failed: {message}")]
    Request { tenant: TenantId, message: String },
    #[error("record for tenant {tenant} has a CustomerID of unexpected type")]
    InvalidRecord { tenant: TenantId },
}

/// Auflösung Tenant ID → Customer ID
///
/// `Ok(None)` bedeutet: kein Eintrag bzw. kein CustomerID Attribut.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customer_id(&self, tenant: &TenantId) -> Result<Option<CustomerId>, LookupError>;
}
