//! Toolkit error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlateError {
    /// Display color depth outside the supported 2..=4 bytes per pixel.
    #[error("unsupported display depth: {0} bytes per pixel")]
    UnsupportedDepth(u8),

    /// Display dimensions must both be positive.
    #[error("display size must be non-zero")]
    ZeroDisplaySize,

    /// Font container failed validation.
    #[error("bad font data: {0}")]
    FontData(String),
}
