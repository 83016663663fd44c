//! Once-per-lane trigger.
//!
//! The host notifies plateflow once per arriving carrier. Lane-wide
//! corrections must run exactly once, when the lane's first carrier
//! arrives: by then the whole lane membership is known.

use std::collections::HashSet;

use plateflow_core::{Carrier, LaneId};

/// True iff `carrier` is the first carrier of its lane.
pub fn should_run(carrier: &Carrier) -> bool {
    carrier.ordinal == 1
}

/// True iff `carrier` is the last carrier of a lane holding `lane_size`.
pub fn is_last(carrier: &Carrier, lane_size: usize) -> bool {
    usize::try_from(carrier.ordinal).is_ok_and(|ordinal| ordinal == lane_size)
}

/// Tracks which lanes already had their setup run.
#[derive(Debug, Default)]
pub struct LaneSetup {
    done: HashSet<LaneId>,
}

impl LaneSetup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the setup of `carrier`'s lane.
    ///
    /// Returns true exactly once per lane, for its first carrier.
    pub fn claim(&mut self, carrier: &Carrier) -> bool {
        should_run(carrier) && self.done.insert(carrier.lane.clone())
    }
}
