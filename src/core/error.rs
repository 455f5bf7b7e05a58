//! Data loading errors.

/// Errors raised while loading configuration or game data.
///
/// These only occur outside a battle; once a battle is running nothing it
/// does can fail fatally.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The JSON document could not be parsed into the expected shape.
    #[error("malformed game data: {0}")]
    Json(#[from] serde_json::Error),
}
