//! plateflow-host: the boundary between plateflow and the host scheduler.
//!
//! The host owns the run plan, the device resources, and the operator
//! console. It calls into plateflow once per carrier arrival and gets back
//! either "continue" or a stop signal.
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!   ├── Topology (lane membership, pending steps)
//!   ├── LaneSetup (first-carrier gate)
//!   │   ├── validate_lane   → fatal stop on labware mismatch
//!   │   ├── balance_lane    → times-used per carrier
//!   │   └── deduplicate     → shared-slot step removal
//!   ├── flush_tubing (last carrier) → ResourcePool
//!   └── Messenger (operator notices)
//! ```

pub mod dispatcher;
pub mod error;
pub mod flush;
pub mod messaging;
pub mod resources;

pub use dispatcher::{Arrival, ArrivalReport, Dispatcher, LaneSetupReport};
pub use error::{DispatchError, DispatchResult};
pub use flush::flush_tubing;
pub use messaging::{Messenger, Notice, RecordingMessenger, Severity, StopSignal, TracingMessenger};
pub use resources::{RecordingPool, ResourceAction, ResourcePool};
