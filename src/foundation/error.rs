use crate::compose::Layer;

/// Result alias used across the crate.
pub type NatriconResult<T> = Result<T, NatriconError>;

/// Structured failure for every stage of avatar generation.
#[derive(thiserror::Error, Debug)]
pub enum NatriconError {
    /// A fragment's markup could not be parsed as SVG.
    #[error("fragment parse error in layer '{layer}': {message}")]
    FragmentParse {
        /// Layer that carried the broken fragment.
        layer: Layer,
        /// Parser diagnostic.
        message: String,
    },

    /// No asset bundle could be resolved for the request.
    #[error("asset lookup error: {0}")]
    AssetLookup(String),

    /// Entropy was too short or not hexadecimal.
    #[error("derivation error: {0}")]
    Derivation(String),

    /// The rasterizer failed to convert a document.
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Out-of-range request or configuration values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Config, manifest or vanity table decoding failed.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NatriconError {
    pub fn fragment_parse(layer: Layer, msg: impl Into<String>) -> Self {
        Self::FragmentParse {
            layer,
            message: msg.into(),
        }
    }

    pub fn asset_lookup(msg: impl Into<String>) -> Self {
        Self::AssetLookup(msg.into())
    }

    pub fn derivation(msg: impl Into<String>) -> Self {
        Self::Derivation(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
