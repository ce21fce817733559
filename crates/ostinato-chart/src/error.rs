use thiserror::Error;

/// Errors that can occur while compositing a chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// An embedded font failed to parse. Only reachable if the bundled
    /// assets are corrupt.
    #[error("invalid font data: {0}")]
    Font(String),

    /// PNG encoding failed.
    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Convenience alias for rendering results.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
