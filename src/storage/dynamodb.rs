use crate::storage::directory::{CustomerDirectory, LookupError};
use crate::storage::models::{CustomerId, TenantId};
use crate::utils::Config;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

const KEY_ATTRIBUTE: &str = "ClientID";
const CUSTOMER_ATTRIBUTE: &str = "CustomerID";

/// DynamoDB Lookup auf den Client_Info Table
pub struct DynamoDbDirectory {
    client: Client,
    table_name: String,
}

impl DynamoDbDirectory {
    /// Erstelle Client aus der Default Credential Chain
    pub async fn new(config: &Config) -> Self {
        let region_provider =
            RegionProviderChain::first_try(config.aws_region.clone().map(Region::new))
                .or_default_provider()
                .or_else("ap-northeast-1");
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let ddb_config = match &config.dynamodb_endpoint {
            Some(endpoint) => aws_sdk_dynamodb::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .build(),
            None => aws_sdk_dynamodb::config::Builder::from(&sdk_config).build(),
        };

        Self::from_client(Client::from_conf(ddb_config), config.dynamodb_table.clone())
    }

    pub fn from_client(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl CustomerDirectory for DynamoDbDirectory {
    async fn customer_id(&self, tenant: &TenantId) -> Result<Option<CustomerId>, LookupError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, AttributeValue::N(tenant.to_string()))
            .send()
            .await
            .map_err(|e| LookupError::Request {
                tenant: *tenant,
                message: DisplayErrorContext(&e).to_string(),
            })?;

        match response.item() {
            Some(item) => customer_id_from_item(tenant, item),
            None => Ok(None),
        }
    }
}

// Helper: CustomerID darf als String oder Number gespeichert sein
fn customer_id_from_item(
    tenant: &TenantId,
    item: &HashMap<String, AttributeValue>,
) -> Result<Option<CustomerId>, LookupError> {
    match item.get(CUSTOMER_ATTRIBUTE) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(AttributeValue::S(s)) if s.is_empty() => Ok(None),
        Some(AttributeValue::S(s)) => Ok(Some(CustomerId::new(s.clone()))),
        Some(AttributeValue::N(n)) => Ok(Some(CustomerId::new(n.clone()))),
        Some(_) => Err(LookupError::InvalidRecord { tenant: *tenant }),
    }
}
