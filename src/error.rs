//! Crate-level error type

use std::path::PathBuf;
use thiserror::Error;

use crate::output::OutputError;
use crate::watermark::WatermarkError;

/// Errors surfaced by the processing entry points
///
/// Every variant is fatal for the image (or input) it concerns. The batch
/// runner records it against that item and moves on.
#[derive(Error, Debug)]
pub enum PhotomarkError {
    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("No supported images found in {}", .0.display())]
    NoImages(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
