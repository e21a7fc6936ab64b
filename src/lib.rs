// Photomark photo watermarking library

pub mod batch;
pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod watermark;

pub use error::PhotomarkError;
