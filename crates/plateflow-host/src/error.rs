//! Host boundary error types.

use thiserror::Error;

use plateflow_adjust::AdjustError;
use plateflow_topology::TopologyError;

/// Errors that can occur while handling a carrier arrival.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("resource already allocated: {0}")]
    AlreadyAllocated(String),

    #[error("resource not allocated: {0}")]
    NotAllocated(String),

    #[error("resource operation failed on {resource}: {reason}")]
    Operation { resource: String, reason: String },

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("lane correction error: {0}")]
    Adjust(#[from] AdjustError),
}

pub type DispatchResult<T> = Result<T, DispatchError>;
