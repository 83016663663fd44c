//! Lane correction error types.

use thiserror::Error;

use plateflow_core::{CarrierKey, LaneId};
use plateflow_topology::TopologyError;

pub type AdjustResult<T> = Result<T, AdjustError>;

/// Errors raised by the lane correction passes.
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("lane {0} has no carriers")]
    EmptyLane(LaneId),

    #[error("no carriers to balance")]
    NoCarriers,

    /// The plan shape does not satisfy the balancer's lane-count precondition.
    #[error(
        "plan has {found} lanes but times-used balancing for lane {lane} requires exactly {required}"
    )]
    LaneCount {
        lane: LaneId,
        required: usize,
        found: usize,
    },

    /// A transfer script asks for a source labware the carrier does not hold.
    #[error(
        "labware mismatch on {carrier}: transfer script indicates {token} source ({script}), but labware supplied is {labware}"
    )]
    LabwareMismatch {
        carrier: CarrierKey,
        operation: String,
        token: String,
        script: String,
        labware: String,
    },

    #[error("topology error: {0}")]
    Topology(#[from] TopologyError),
}

impl AdjustError {
    /// Whether the host must stop the run rather than continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AdjustError::LabwareMismatch { .. })
    }
}
