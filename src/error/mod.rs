use std::path::PathBuf;

use crate::pixel::PixelBufferError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid edit script: {0}")]
    Script(#[from] serde_json::Error),

    #[error("failed to serialize replay report: {0}")]
    Report(#[source] serde_json::Error),

    #[error(transparent)]
    Pixel(#[from] PixelBufferError),

    #[error("canvas size is invalid: {width}x{height} at ratio {ratio}")]
    CanvasSize { width: f32, height: f32, ratio: f32 },

    #[error("could not load image onto the canvas")]
    LoadRejected,

    #[error("script step {index} ({op}) was rejected")]
    StepRejected { index: usize, op: &'static str },
}
