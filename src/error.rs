//! Error types for the paged grid.

use thiserror::Error;

/// Failures the grid itself can produce.
///
/// Data-source failures are not wrapped here; `size`/`fetch` errors
/// propagate to the embedding application as-is.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("page size must be a positive integer, got {0}")]
    InvalidPageSize(usize),

    #[error("paginator window size must be a positive integer, got {0}")]
    InvalidWindowSize(usize),
}
