use thiserror::Error;

/// Rendering pipeline errors
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Scale factor must be a positive number, got {0}")]
    InvalidScaleFactor(f64),
    #[error("Invalid chart configuration: {0}")]
    InvalidConfig(String),
    #[error("Drawing failed: {0}")]
    Drawing(String),
    #[error("Image encoding failed: {0}")]
    Encoding(#[from] image::ImageError),
}

impl ChartError {
    /// Wrap a plotters drawing error, which is generic over the backend
    pub fn drawing<E: std::fmt::Display>(e: E) -> Self {
        ChartError::Drawing(e.to_string())
    }
}
