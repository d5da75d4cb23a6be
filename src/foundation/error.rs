/// Crate-wide result alias.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Errors produced by catalog loading, generation, compositing, and variant rendering.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// The request, catalog, or option set is malformed. Raised before any generation work.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A layer has no traits to draw from.
    #[error("empty layer: layer '{layer}' has no traits")]
    EmptyLayer {
        /// Offending layer name.
        layer: String,
    },

    /// A trait source file could not be read or decoded.
    #[error("resource not found: '{file}' in layer '{layer}': {reason}")]
    ResourceNotFound {
        /// Layer name (or layer path when no name is known).
        layer: String,
        /// Trait file name.
        file: String,
        /// Underlying cause.
        reason: String,
    },

    /// The attempt budget ran out before the requested number of unique assets was drawn.
    #[error(
        "uniqueness exhausted: produced {produced} of {requested} unique assets after {attempts} attempts"
    )]
    UniquenessExhausted {
        /// Unique assets accepted before the budget ran out.
        produced: usize,
        /// Requested batch size.
        requested: usize,
        /// Draws consumed.
        attempts: usize,
    },

    /// A compositing backend failed. Normally absorbed by the compositor fallback chain.
    #[error("render backend error ({backend}): {message}")]
    RenderBackend {
        /// Backend name.
        backend: &'static str,
        /// Failure description.
        message: String,
    },

    /// Image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An output buffer could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Metadata (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, usually IO with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForgeError {
    /// Build a [`ForgeError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ForgeError::ResourceNotFound`].
    pub fn resource_not_found(
        layer: impl Into<String>,
        file: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ResourceNotFound {
            layer: layer.into(),
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ForgeError::RenderBackend`].
    pub fn backend(backend: &'static str, msg: impl Into<String>) -> Self {
        Self::RenderBackend {
            backend,
            message: msg.into(),
        }
    }

    /// Build a [`ForgeError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ForgeError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
