pub mod input;
pub mod migrator;

pub use input::MigrationRequest;
pub use migrator::{MigrationError, Migrator};
