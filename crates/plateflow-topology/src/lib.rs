//! plateflow-topology: read/write access to the carriers of a run plan.
//!
//! The host scheduler owns the plan; plateflow only looks carriers up by
//! lane and edits their pending operations. [`Topology`] is that seam, and
//! [`RunPlan`] is the in-memory implementation used by the CLI and tests.

pub mod error;
pub mod plan;
pub mod topology;

pub use error::{TopologyError, TopologyResult};
pub use plan::{PlanFile, RunPlan};
pub use topology::Topology;
