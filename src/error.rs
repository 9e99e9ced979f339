use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing a color value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Color value is empty")]
    Empty,

    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// Errors reported by the stroke canvas setters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    #[error("Invalid brush size: {0}")]
    InvalidBrushSize(f32),

    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Errors that can occur while loading a background image
#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Failed to decode background image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to read background image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while exporting the canvas
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error("Canvas has no area to export")]
    EmptyCanvas,

    #[error("Failed to allocate a {width}x{height} raster")]
    Raster { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export worker stopped before reporting a result")]
    WorkerLost,
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Failure of a UI action routed through the screen controller
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
