//! The topology seam between the host scheduler and plateflow.

use plateflow_core::{Carrier, CarrierKey, LaneId};

use crate::error::{TopologyError, TopologyResult};

/// Access to the carriers of one running plan.
///
/// Lane slices are always ordered by ascending ordinal.
pub trait Topology {
    /// All lane ids, in a stable order.
    fn lane_ids(&self) -> Vec<LaneId>;

    fn carriers_in_lane(&self, lane: &LaneId) -> TopologyResult<&[Carrier]>;

    fn carriers_in_lane_mut(&mut self, lane: &LaneId) -> TopologyResult<&mut [Carrier]>;

    /// Every carrier of the plan, lane by lane.
    fn all_carriers(&self) -> Vec<&Carrier> {
        self.lane_ids()
            .iter()
            .filter_map(|lane| self.carriers_in_lane(lane).ok())
            .flatten()
            .collect()
    }

    fn carrier(&self, key: &CarrierKey) -> TopologyResult<&Carrier> {
        self.carriers_in_lane(&key.lane)?
            .iter()
            .find(|c| c.ordinal == key.ordinal)
            .ok_or_else(|| TopologyError::CarrierNotFound(key.clone()))
    }

    fn lane_count(&self) -> usize {
        self.lane_ids().len()
    }

    fn lane_size(&self, lane: &LaneId) -> TopologyResult<usize> {
        Ok(self.carriers_in_lane(lane)?.len())
    }

    /// Number of carriers that do not belong to `lane`.
    fn count_outside_lane(&self, lane: &LaneId) -> usize {
        self.all_carriers()
            .iter()
            .filter(|c| &c.lane != lane)
            .count()
    }
}
