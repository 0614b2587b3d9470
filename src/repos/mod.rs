pub mod error;
pub mod memory_store;
pub mod pg_store;
pub mod store;

pub use error::{RepoError, RepoResult};
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use store::{DataStore, Row};
