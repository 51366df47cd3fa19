use thiserror::Error;

/// Errors raised at the boundaries of the mock database.
///
/// Plain CRUD on [`MockDatabase`](crate::MockDatabase) never fails: a missing
/// record is `None` or `false`. These variants cover schema validation and
/// the parsing of seed files, snapshots and configuration.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record input was a JSON value other than an object.
    #[error("record fields must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Typed input failed validation, or a stored record does not decode.
    #[error("invalid {collection} record: {message}")]
    Schema { collection: String, message: String },

    /// Seed data could not be loaded.
    #[error("seed data error: {0}")]
    Seed(String),

    /// Snapshot is internally inconsistent.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DbError {
    pub(crate) fn schema(collection: &str, message: impl Into<String>) -> Self {
        DbError::Schema {
            collection: collection.to_string(),
            message: message.into(),
        }
    }
}
