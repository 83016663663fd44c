//! plateflow-adjust: lane-wide corrections to pending carrier steps.
//!
//! These passes run once per lane, when its first carrier arrives, and edit
//! the pending operations of every carrier in the lane before the host
//! executes them.
//!
//! # Components
//!
//! - **`trigger`**: once-per-lane gate (first-ordinal check, setup tracking)
//! - **`validator`**: source labware vs. transfer script check
//! - **`balancer`**: cross-lane times-used split with an exact-sum total
//! - **`dedup`**: preparatory/closing step removal for shared slots

pub mod balancer;
pub mod dedup;
pub mod error;
pub mod trigger;
pub mod validator;

pub use balancer::{LaneUsage, allocate_usage, balance, balance_lane};
pub use dedup::{
    CarrierEdit, RemovedPair, SlotVisit, Stripped, deduplicate, slot_visits, strip_pairs,
};
pub use error::{AdjustError, AdjustResult};
pub use trigger::{LaneSetup, is_last, should_run};
pub use validator::{validate_carrier, validate_lane};
