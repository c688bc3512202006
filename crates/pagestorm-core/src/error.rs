// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pagestorm.

use thiserror::Error;

/// Top-level error type for all Pagestorm operations.
#[derive(Debug, Error)]
pub enum StormError {
    // -- Configuration --
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // -- Document output --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("document writer already finalized")]
    WriterClosed,

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StormError>;
