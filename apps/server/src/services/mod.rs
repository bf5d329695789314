//! Service layer - business logic between handlers and storage

pub mod property;
pub mod search;
pub mod upload;

pub use property::PropertyService;
pub use search::{SearchPage, SearchService};
pub use upload::{IncomingFile, UploadService};
