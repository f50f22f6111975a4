/// Convenience result type used across drape.
pub type DrapeResult<T> = Result<T, DrapeError>;

/// Top-level error taxonomy used by session and asset APIs.
///
/// Every variant is session-local and recoverable; a failing operation never leaves
/// partially applied state behind.
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    /// The pose estimator failed or is not available. Callers degrade to fallback placement.
    #[error("pose detection unavailable: {0}")]
    DetectionUnavailable(String),

    /// A clothing kind did not resolve to a usable asset.
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),

    /// Malformed or missing background colour.
    #[error("invalid background: {0}")]
    InvalidBackground(String),

    /// Export requested before any image was loaded.
    #[error("nothing to export: no image loaded")]
    NothingToExport,

    /// An operation needs a loaded image and none is present.
    #[error("no image loaded: {0}")]
    NoImage(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DrapeError {
    /// Build a [`DrapeError::DetectionUnavailable`] value.
    pub fn detection_unavailable(msg: impl Into<String>) -> Self {
        Self::DetectionUnavailable(msg.into())
    }

    /// Build a [`DrapeError::AssetUnavailable`] value.
    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Self::AssetUnavailable(msg.into())
    }

    /// Build a [`DrapeError::InvalidBackground`] value.
    pub fn invalid_background(msg: impl Into<String>) -> Self {
        Self::InvalidBackground(msg.into())
    }

    /// Build a [`DrapeError::NoImage`] value.
    pub fn no_image(msg: impl Into<String>) -> Self {
        Self::NoImage(msg.into())
    }

    /// Build a [`DrapeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DrapeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
