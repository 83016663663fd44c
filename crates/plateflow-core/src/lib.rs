//! plateflow-core: shared run-plan types and configuration.

pub mod config;
pub mod types;

pub use config::{
    BalancerConfig, DedupConfig, FlushConfig, LabwareRule, PlateflowConfig, ValidatorConfig,
};
pub use types::*;
