//! Database layer - listing and upload storage

pub mod memory;
pub mod postgres;
pub mod sql;
pub mod traits;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use traits::{PropertyStore, UploadStore};
