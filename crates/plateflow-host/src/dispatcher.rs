//! Arrival dispatcher: the single entry point the host calls.
//!
//! The host calls [`Dispatcher::on_arrival`] once per carrier reaching the
//! correction step. The dispatcher:
//! - runs lane setup (validator, balancer, dedup) once per lane, on the
//!   lane's first carrier, applying only the passes scoped to that lane
//! - flushes dispenser tubing when the last carrier of a flush lane arrives
//! - latches a stop signal after a fatal validation failure

use serde::Serialize;
use tracing::{debug, info, warn};

use plateflow_adjust::{
    AdjustError, CarrierEdit, LaneSetup, LaneUsage, balance_lane, deduplicate, is_last,
    validate_lane,
};
use plateflow_core::{CarrierKey, LaneId, PlateflowConfig};
use plateflow_topology::Topology;

use crate::error::DispatchResult;
use crate::flush::flush_tubing;
use crate::messaging::{Messenger, Notice, Severity, StopSignal};
use crate::resources::ResourcePool;

/// What the host should do after an arrival.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Arrival {
    Continue(ArrivalReport),
    Stop(StopSignal),
}

impl Arrival {
    pub fn is_stop(&self) -> bool {
        matches!(self, Arrival::Stop(_))
    }
}

/// Work done for one arrival.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalReport {
    pub carrier: CarrierKey,
    /// Present only for the arrival that ran its lane's setup.
    pub setup: Option<LaneSetupReport>,
    /// Dispensers flushed on this arrival.
    pub flushed: Vec<String>,
}

/// Result of the once-per-lane corrections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneSetupReport {
    pub lane: LaneId,
    pub usage: Option<LaneUsage>,
    pub edits: Vec<CarrierEdit>,
}

/// Applies plateflow corrections as carriers arrive.
pub struct Dispatcher<T, M, P> {
    topology: T,
    messenger: M,
    resources: P,
    config: PlateflowConfig,
    setup: LaneSetup,
    stopped: Option<StopSignal>,
}

impl<T, M, P> Dispatcher<T, M, P>
where
    T: Topology,
    M: Messenger,
    P: ResourcePool,
{
    pub fn new(topology: T, messenger: M, resources: P, config: PlateflowConfig) -> Self {
        Self {
            topology,
            messenger,
            resources,
            config,
            setup: LaneSetup::new(),
            stopped: None,
        }
    }

    /// Handle the arrival of `key` at the correction step.
    ///
    /// Once a stop has been issued every later arrival gets the same stop.
    pub fn on_arrival(&mut self, key: &CarrierKey) -> DispatchResult<Arrival> {
        if let Some(signal) = &self.stopped {
            debug!(carrier = %key, "run already stopped");
            return Ok(Arrival::Stop(signal.clone()));
        }

        let lane_size = self.topology.lane_size(&key.lane)?;
        let carrier = self.topology.carrier(key)?;
        let run_setup = self.setup.claim(carrier);
        let last = is_last(carrier, lane_size);

        let mut report = ArrivalReport {
            carrier: key.clone(),
            setup: None,
            flushed: Vec::new(),
        };

        if !run_setup {
            debug!(carrier = %key, "lane setup already done");
        } else if !self.config.corrects_lane(&key.lane) {
            debug!(lane = %key.lane, "no corrections scoped to lane");
        } else {
            match self.run_lane_setup(&key.lane)? {
                Ok(setup) => report.setup = Some(setup),
                Err(signal) => return Ok(Arrival::Stop(signal)),
            }
        }

        if last && self.config.flush.applies_to(&key.lane) {
            report.flushed =
                flush_tubing(&mut self.resources, &mut self.messenger, &self.config.flush)?;
        }

        Ok(Arrival::Continue(report))
    }

    /// Run the lane-wide corrections for `lane`.
    ///
    /// The inner `Err` is a stop the host must obey.
    fn run_lane_setup(
        &mut self,
        lane: &LaneId,
    ) -> DispatchResult<Result<LaneSetupReport, StopSignal>> {
        info!(%lane, "running lane setup");
        let mut report = LaneSetupReport {
            lane: lane.clone(),
            usage: None,
            edits: Vec::new(),
        };

        if self.config.validator.applies_to(lane) {
            let carriers = self.topology.carriers_in_lane(lane)?;
            match validate_lane(carriers, &self.config.validator) {
                Ok(()) => {}
                Err(err) if err.is_fatal() => return Ok(Err(self.stop(&err))),
                Err(err) => return Err(err.into()),
            }
        }

        if self.config.balancer.applies_to(lane) {
            match balance_lane(&mut self.topology, lane, &self.config.balancer) {
                Ok(usage) => report.usage = Some(usage),
                Err(err @ AdjustError::LaneCount { .. }) => {
                    warn!(%lane, error = %err, "times-used balancing skipped");
                    self.messenger.notify(Notice::new(
                        Severity::Serious,
                        "Unsupported lane count",
                        err.to_string(),
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        }

        if self.config.dedup.applies_to(lane) {
            let carriers = self.topology.carriers_in_lane_mut(lane)?;
            report.edits = deduplicate(
                carriers,
                &self.config.dedup.preparatory,
                &self.config.dedup.closing,
            );
        }

        Ok(Ok(report))
    }

    fn stop(&mut self, err: &AdjustError) -> StopSignal {
        let message = format!("Stopping system due to {err}");
        self.messenger
            .notify(Notice::new(Severity::Fatal, "Run stopped", message.clone()));
        let signal = StopSignal::fatal(message);
        self.stopped = Some(signal.clone());
        signal
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_some()
    }

    pub fn topology(&self) -> &T {
        &self.topology
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn resources(&self) -> &P {
        &self.resources
    }

    pub fn config(&self) -> &PlateflowConfig {
        &self.config
    }

    /// Hand the (edited) topology back to the host.
    pub fn into_topology(self) -> T {
        self.topology
    }
}
