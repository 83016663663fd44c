use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use plateflow_core::{CarrierKey, PlateflowConfig};
use plateflow_host::{Arrival, Dispatcher, Notice, RecordingMessenger, RecordingPool};
use plateflow_topology::{PlanFile, RunPlan, Topology};

/// Everything a replay produced.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub arrivals: Vec<Arrival>,
    pub notices: Vec<Notice>,
    pub stopped: bool,
    pub plan: PlanFile,
}

pub struct RunArgs<'a> {
    pub plan: &'a str,
    pub config: Option<&'a str>,
    pub resources: &'a [String],
    pub format: &'a str,
    pub out: Option<&'a str>,
}

pub fn run(args: RunArgs<'_>) -> anyhow::Result<()> {
    let plan = RunPlan::from_file(Path::new(args.plan))?;
    let config = match args.config {
        Some(path) => PlateflowConfig::from_file(Path::new(path))?,
        None => PlateflowConfig::default(),
    };

    let summary = replay(plan, config, RecordingPool::new(args.resources.iter().cloned()))?;

    if let Some(out) = args.out {
        std::fs::write(out, serde_json::to_string_pretty(&summary.plan)?)?;
        info!(path = out, "adjusted plan written");
    }

    match args.format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print!("{}", format_summary(&summary)),
    }

    if summary.stopped {
        anyhow::bail!("run stopped");
    }
    Ok(())
}

/// Feed every carrier to the dispatcher, lanes interleaved by ordinal.
///
/// Stops at the first stop signal.
pub fn replay(
    plan: RunPlan,
    config: PlateflowConfig,
    pool: RecordingPool,
) -> anyhow::Result<RunSummary> {
    let mut keys: Vec<CarrierKey> = plan.all_carriers().iter().map(|c| c.key()).collect();
    keys.sort_by(|a, b| a.ordinal.cmp(&b.ordinal).then_with(|| a.lane.cmp(&b.lane)));

    let mut dispatcher = Dispatcher::new(plan, RecordingMessenger::new(), pool, config);
    let mut arrivals = Vec::with_capacity(keys.len());
    for key in &keys {
        let arrival = dispatcher.on_arrival(key)?;
        let stop = arrival.is_stop();
        arrivals.push(arrival);
        if stop {
            break;
        }
    }

    let stopped = dispatcher.is_stopped();
    let notices = dispatcher.messenger().notices().to_vec();
    let plan = dispatcher.into_topology().to_plan_file();
    Ok(RunSummary {
        arrivals,
        notices,
        stopped,
        plan,
    })
}

pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    for arrival in &summary.arrivals {
        match arrival {
            Arrival::Continue(report) => {
                let _ = writeln!(out, "▸ {}", report.carrier);
                if let Some(setup) = &report.setup {
                    if let Some(usage) = &setup.usage {
                        let _ = writeln!(
                            out,
                            "    times-used (target {}): {:?}",
                            usage.target, usage.counts
                        );
                    }
                    for edit in &setup.edits {
                        let removed: Vec<String> = edit
                            .removed
                            .iter()
                            .map(|p| format!("{} + {}", p.step, p.paired))
                            .collect();
                        if !removed.is_empty() {
                            let _ = writeln!(out, "    {} removed: {}", edit.carrier, removed.join(", "));
                        }
                        if !edit.unpaired.is_empty() {
                            let _ = writeln!(
                                out,
                                "    {} kept unpaired: {}",
                                edit.carrier,
                                edit.unpaired.join(", ")
                            );
                        }
                    }
                }
                if !report.flushed.is_empty() {
                    let _ = writeln!(out, "    flushed: {}", report.flushed.join(", "));
                }
            }
            Arrival::Stop(signal) => {
                let _ = writeln!(out, "✗ STOP: {}", signal.message);
            }
        }
    }

    if !summary.notices.is_empty() {
        let _ = writeln!(out, "\nNotices:");
        for notice in &summary.notices {
            let _ = writeln!(out, "  [{:?}] {}: {}", notice.severity, notice.title, notice.detail);
        }
    }

    let _ = writeln!(out, "\nPending steps:");
    for carrier in &summary.plan.carriers {
        let _ = writeln!(out, "  {}: {}", carrier.key(), carrier.pending_names().join(" → "));
    }
    out
}
