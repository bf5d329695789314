use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("search term is required")]
    MissingSearchTerm,

    #[error("owner subject must not be empty")]
    MissingOwner,
}
