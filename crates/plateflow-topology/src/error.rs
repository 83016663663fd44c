//! Error types for the topology provider.

use thiserror::Error;

use plateflow_core::{CarrierKey, LaneId};

/// Result type alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors raised while building or querying a run plan.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("lane not found: {0}")]
    LaneNotFound(LaneId),

    #[error("carrier not found: {0}")]
    CarrierNotFound(CarrierKey),

    #[error("duplicate carrier ordinal: {0}")]
    DuplicateOrdinal(CarrierKey),

    #[error("lane {lane} ordinals are not dense: expected {expected}, found {found}")]
    SparseOrdinals {
        lane: LaneId,
        expected: u32,
        found: u32,
    },

    #[error("failed to read plan: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse plan: {0}")]
    Parse(#[from] serde_json::Error),
}
