//! Core error types for hybrid-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! validation failures of the data model.

use thiserror::Error;

/// Core errors produced by the hybrid-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A descriptor cannot become a script record (e.g. it carries no code).
    #[error("invalid script: {reason}")]
    InvalidScript { reason: String },

    /// A script identifier was empty or otherwise unusable as a key.
    #[error("invalid script id: {reason}")]
    InvalidId { reason: String },
}
