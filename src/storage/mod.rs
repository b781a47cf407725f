pub mod directory;
pub mod dynamodb;
pub mod models;

pub use directory::{CustomerDirectory, LookupError};
pub use dynamodb::DynamoDbDirectory;
pub use models::{CustomerId, InvalidTenantId, TenantId};

#[cfg(test)]
pub use directory::MockCustomerDirectory;
