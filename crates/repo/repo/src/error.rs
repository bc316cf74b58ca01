use thiserror::Error;

/// Errors that can occur in the file group repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A backend error occurred (connection, query, storage).
    #[error("repository backend error: {0}")]
    Backend(String),

    /// A stored record could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}
