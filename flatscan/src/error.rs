/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use thiserror::Error;

/// Convenience alias for a `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type shared through the search core.
///
/// All failures are terminal for the call that produced them; there is no retry logic.
/// After an error, caller output buffers are in an unspecified but valid state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The interrupt callback requested cancellation. Raised at the next poll point.
    #[error("search was interrupted")]
    Cancelled,

    /// Caller-provided buffers disagree about the problem shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Construction of a worker thread pool failed.
    #[error("thread pool construction failed: {0}")]
    ThreadPool(String),
}

impl From<crate::views::TryFromError> for Error {
    fn from(err: crate::views::TryFromError) -> Self {
        Self::ShapeMismatch(err.to_string())
    }
}
