//! plateflow.toml configuration parser.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults used by the stock protocol scripts.
//!
//! Each pass carries a `lanes` list naming the lanes it runs on. The
//! correction passes default to the `source` lane and the tubing flush to
//! the `dest` lane. An empty list applies the pass to every lane.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::LaneId;

fn lane_in_scope(lanes: &[LaneId], lane: &LaneId) -> bool {
    lanes.is_empty() || lanes.contains(lane)
}

fn lanes(names: &[&str]) -> Vec<LaneId> {
    names.iter().map(|name| LaneId::new(*name)).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateflowConfig {
    pub balancer: BalancerConfig,
    pub dedup: DedupConfig,
    pub validator: ValidatorConfig,
    pub flush: FlushConfig,
}

/// Cross-lane times-used balancing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    pub enabled: bool,
    /// Lanes whose carriers share the one physical source.
    pub lanes: Vec<LaneId>,
    /// Case-sensitive substring identifying the shared-source operation.
    pub operation_contains: String,
    /// Parameter receiving the computed repetition count.
    pub parameter: String,
    /// Number of lanes the plan must have.
    pub required_lanes: usize,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lanes: lanes(&["source"]),
            operation_contains: "Transfer".to_string(),
            parameter: "TimesUsed".to_string(),
            required_lanes: 2,
        }
    }
}

/// Removal of repeated steps for carriers sharing a physical slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub enabled: bool,
    pub lanes: Vec<LaneId>,
    /// Kept only on the first visitor of a slot.
    pub preparatory: Vec<String>,
    /// Kept only on the last visitor of a slot.
    pub closing: Vec<String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lanes: lanes(&["source"]),
            preparatory: vec!["SPIN".to_string(), "PIERCE".to_string()],
            closing: vec!["SEAL".to_string()],
        }
    }
}

/// Labware check for liquid transfer source carriers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub enabled: bool,
    /// Lanes holding source labware.
    pub lanes: Vec<LaneId>,
    /// Case-insensitive substring of the operations to inspect.
    pub step_contains: String,
    /// Parameter holding the transfer script name.
    pub parameter: String,
    pub rules: Vec<LabwareRule>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lanes: lanes(&["source"]),
            step_contains: "LIQUIDTRANSFER".to_string(),
            parameter: "Script Name".to_string(),
            rules: vec![
                LabwareRule {
                    script_token: "PP".to_string(),
                    labware_contains: "LABCYTE_POLYPROPYLENE".to_string(),
                },
                LabwareRule {
                    script_token: "LDV".to_string(),
                    labware_contains: "LABCYTE_DIAMOND".to_string(),
                },
            ],
        }
    }
}

/// A script token and the labware it demands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabwareRule {
    /// Case-sensitive substring of the script name.
    pub script_token: String,
    /// Case-insensitive substring the carrier's labware name must contain.
    pub labware_contains: String,
}

/// Dispenser tubing flush after the last carrier of a lane.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushConfig {
    pub enabled: bool,
    /// Lanes whose last carrier triggers the flush.
    pub lanes: Vec<LaneId>,
    pub resources: Vec<String>,
    pub operation: String,
    pub parameter: String,
    pub volume: i64,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lanes: lanes(&["dest"]),
            resources: vec![
                "Combi 1".to_string(),
                "Combi 2".to_string(),
                "Combi 3".to_string(),
            ],
            operation: "Empty".to_string(),
            parameter: "Volume".to_string(),
            volume: 1200,
        }
    }
}

impl BalancerConfig {
    pub fn applies_to(&self, lane: &LaneId) -> bool {
        self.enabled && lane_in_scope(&self.lanes, lane)
    }
}

impl DedupConfig {
    pub fn applies_to(&self, lane: &LaneId) -> bool {
        self.enabled && lane_in_scope(&self.lanes, lane)
    }
}

impl ValidatorConfig {
    pub fn applies_to(&self, lane: &LaneId) -> bool {
        self.enabled && lane_in_scope(&self.lanes, lane)
    }
}

impl FlushConfig {
    pub fn applies_to(&self, lane: &LaneId) -> bool {
        self.enabled && lane_in_scope(&self.lanes, lane)
    }
}

impl PlateflowConfig {
    /// Whether any lane-setup pass runs on `lane`.
    pub fn corrects_lane(&self, lane: &LaneId) -> bool {
        self.validator.applies_to(lane) || self.balancer.applies_to(lane) || self.dedup.applies_to(lane)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PlateflowConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a plateflow.toml with every hook spelled out.
    pub fn scaffold() -> Self {
        PlateflowConfig {
            flush: FlushConfig {
                enabled: true,
                ..FlushConfig::default()
            },
            ..PlateflowConfig::default()
        }
    }
}
