pub type GlyphcastResult<T> = Result<T, GlyphcastError>;

#[derive(thiserror::Error, Debug)]
pub enum GlyphcastError {
    /// Malformed or missing input (bad logical screen, unreadable bytes).
    #[error("decode error: {0}")]
    Decode(String),

    /// User parameters rejected before any pipeline work starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// Output stream assembly failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// The run was cancelled or superseded between frames; no partial
    /// output was emitted.
    #[error("conversion aborted before completion")]
    Aborted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphcastError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
