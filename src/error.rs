use thiserror::Error;

/// Errors surfaced by region queries.
///
/// A region that is valid but matches nothing is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl RegionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RegionError::InvalidGeometry(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store error: {0}")]
    Sled(#[from] sled::Error),

    #[error("corrupt row in tree '{tree}': {source}")]
    Decode {
        tree: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode row: {0}")]
    Encode(#[from] serde_json::Error),
}
