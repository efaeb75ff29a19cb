/// Convenience result type used across the crate.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy for planning, encoding and playback.
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// Frame dimensions alone exceed the atlas ceiling, even at a 1x1 grid.
    #[error("too large: can't fit a {width}x{height} frame into an atlas")]
    TooLarge {
        /// Frame width in pixels.
        width: u32,
        /// Frame height in pixels.
        height: u32,
    },

    /// The probe tool failed or returned an incomplete result.
    #[error("probe error: {0}")]
    Probe(String),

    /// The render tool failed to produce an atlas image.
    #[error("render error: {0}")]
    Render(String),

    /// A manifest could not be read, parsed, validated or written.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// A player API was used in a way its session does not allow.
    #[error("usage error: {0}")]
    Usage(String),

    /// Invalid caller-provided values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::TooLarge`] value.
    pub fn too_large(width: u32, height: u32) -> Self {
        Self::TooLarge { width, height }
    }

    /// Build a [`FlipbookError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`FlipbookError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FlipbookError::Manifest`] value.
    pub fn manifest(msg: impl Into<String>) -> Self {
        Self::Manifest(msg.into())
    }

    /// Build a [`FlipbookError::Usage`] value.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
