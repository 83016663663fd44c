//! In-memory run plan.
//!
//! Carriers are grouped by lane and kept sorted by ordinal. Construction
//! rejects plans whose ordinals are duplicated or leave gaps, so every lane
//! is exactly `1..=N`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use plateflow_core::{Carrier, LaneId};

use crate::error::{TopologyError, TopologyResult};
use crate::topology::Topology;

/// On-disk form of a run plan: a flat carrier list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFile {
    pub carriers: Vec<Carrier>,
}

/// A validated run plan, lane id → carriers ordered by ordinal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunPlan {
    lanes: BTreeMap<LaneId, Vec<Carrier>>,
}

impl RunPlan {
    /// Group carriers into lanes and check ordinal density.
    pub fn from_carriers(carriers: Vec<Carrier>) -> TopologyResult<Self> {
        let mut lanes: BTreeMap<LaneId, Vec<Carrier>> = BTreeMap::new();
        for carrier in carriers {
            lanes.entry(carrier.lane.clone()).or_default().push(carrier);
        }

        for (lane, carriers) in lanes.iter_mut() {
            carriers.sort_by_key(|c| c.ordinal);
            for pair in carriers.windows(2) {
                if pair[0].ordinal == pair[1].ordinal {
                    return Err(TopologyError::DuplicateOrdinal(pair[1].key()));
                }
            }
            for (expected, carrier) in (1u32..).zip(carriers.iter()) {
                if carrier.ordinal != expected {
                    return Err(TopologyError::SparseOrdinals {
                        lane: lane.clone(),
                        expected,
                        found: carrier.ordinal,
                    });
                }
            }
            debug!(%lane, carriers = carriers.len(), "lane loaded");
        }

        Ok(Self { lanes })
    }

    pub fn from_json_str(json: &str) -> TopologyResult<Self> {
        let file: PlanFile = serde_json::from_str(json)?;
        Self::from_carriers(file.carriers)
    }

    pub fn from_file(path: &Path) -> TopologyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let plan = Self::from_json_str(&content)?;
        debug!(?path, lanes = plan.lanes.len(), "run plan loaded");
        Ok(plan)
    }

    /// Flatten back into the on-disk form.
    pub fn to_plan_file(&self) -> PlanFile {
        PlanFile {
            carriers: self.lanes.values().flatten().cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

impl Topology for RunPlan {
    fn lane_ids(&self) -> Vec<LaneId> {
        self.lanes.keys().cloned().collect()
    }

    fn carriers_in_lane(&self, lane: &LaneId) -> TopologyResult<&[Carrier]> {
        self.lanes
            .get(lane)
            .map(Vec::as_slice)
            .ok_or_else(|| TopologyError::LaneNotFound(lane.clone()))
    }

    fn carriers_in_lane_mut(&mut self, lane: &LaneId) -> TopologyResult<&mut [Carrier]> {
        self.lanes
            .get_mut(lane)
            .map(Vec::as_mut_slice)
            .ok_or_else(|| TopologyError::LaneNotFound(lane.clone()))
    }

    fn all_carriers(&self) -> Vec<&Carrier> {
        self.lanes.values().flatten().collect()
    }
}
