//! Cross-lane times-used balancing.
//!
//! A single physical source serves every carrier of the sibling lane. The
//! source lane's carriers split that usage between them: each gets
//! `ceil(target / n)` until the target is exhausted, the carrier that
//! crosses the target gets the remainder, and the rest get zero. The counts
//! always sum to the target exactly.

use serde::Serialize;
use tracing::{debug, info};

use plateflow_core::{BalancerConfig, Carrier, LaneId, Operation, ParamValue};
use plateflow_topology::Topology;

use crate::error::{AdjustError, AdjustResult};

/// Outcome of balancing one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneUsage {
    pub lane: LaneId,
    /// Total usage the lane had to cover.
    pub target: u32,
    /// Times-used per carrier, in ordinal order.
    pub counts: Vec<u32>,
    /// Carriers whose pending steps had no matching operation.
    pub unmatched: usize,
}

/// Split `target` across `carrier_count` carriers.
///
/// Returns an empty vector when there are no carriers.
pub fn allocate_usage(carrier_count: usize, target: u32) -> Vec<u32> {
    if carrier_count == 0 {
        return Vec::new();
    }
    let n = u32::try_from(carrier_count).unwrap_or(u32::MAX);
    let base = target.div_ceil(n);

    let mut cumulative: u32 = 0;
    (0..carrier_count)
        .map(|_| {
            let count = if cumulative.saturating_add(base) > target {
                target - cumulative
            } else {
                base
            };
            cumulative += count;
            count
        })
        .collect()
}

/// Write balanced times-used counts into the carriers' pending steps.
///
/// For each carrier the first pending operation accepted by `is_target`
/// receives `parameter = count`. Carriers without such an operation are
/// skipped. Returns the computed counts in carrier order.
pub fn balance(
    carriers: &mut [Carrier],
    target: u32,
    is_target: impl Fn(&Operation) -> bool,
    parameter: &str,
) -> AdjustResult<Vec<u32>> {
    let Some(first) = carriers.first() else {
        return Err(AdjustError::NoCarriers);
    };
    let lane = first.lane.clone();

    let counts = allocate_usage(carriers.len(), target);
    for (carrier, &count) in carriers.iter_mut().zip(&counts) {
        let ordinal = carrier.ordinal;
        match carrier.find_pending_mut(&is_target) {
            Some(op) => {
                op.set_param(parameter, ParamValue::from(count));
                debug!(%lane, ordinal, operation = %op.name, count, "times-used set");
            }
            None => {
                debug!(%lane, ordinal, "no matching operation, skipping");
            }
        }
    }
    Ok(counts)
}

/// Balance `lane` against the number of carriers in the rest of the plan.
///
/// The plan must have exactly `config.required_lanes` lanes; otherwise the
/// lane is left untouched and [`AdjustError::LaneCount`] is returned.
pub fn balance_lane<T: Topology>(
    topology: &mut T,
    lane: &LaneId,
    config: &BalancerConfig,
) -> AdjustResult<LaneUsage> {
    let found = topology.lane_count();
    if found != config.required_lanes {
        return Err(AdjustError::LaneCount {
            lane: lane.clone(),
            required: config.required_lanes,
            found,
        });
    }

    let target = u32::try_from(topology.count_outside_lane(lane)).unwrap_or(u32::MAX);
    let carriers = topology.carriers_in_lane_mut(lane)?;
    if carriers.is_empty() {
        return Err(AdjustError::EmptyLane(lane.clone()));
    }

    let needle = config.operation_contains.as_str();
    let is_target = |op: &Operation| op.name.contains(needle);
    let unmatched = carriers
        .iter()
        .filter(|c| !c.pending.iter().any(is_target))
        .count();
    let counts = balance(carriers, target, is_target, &config.parameter)?;

    info!(
        %lane,
        target,
        carriers = counts.len(),
        unmatched,
        "times-used balanced"
    );

    Ok(LaneUsage {
        lane: lane.clone(),
        target,
        counts,
        unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateflow_core::Slot;
    use plateflow_topology::RunPlan;

    fn carrier(lane: &str, ordinal: u32, steps: &[&str]) -> Carrier {
        Carrier {
            ordinal,
            lane: LaneId::new(lane),
            slot: Slot::new("Hotel 1", 1, ordinal),
            labware: String::new(),
            pending: steps.iter().map(|s| Operation::new(*s)).collect(),
        }
    }

    fn lane(name: &str, n: u32, steps: &[&str]) -> Vec<Carrier> {
        (1..=n).map(|i| carrier(name, i, steps)).collect()
    }

    fn times_used(carrier: &Carrier) -> Option<i64> {
        carrier
            .pending
            .iter()
            .find_map(|op| op.param("TimesUsed").and_then(ParamValue::as_int))
    }

    #[test]
    fn three_carriers_cover_ten() {
        assert_eq!(allocate_usage(3, 10), vec![4, 4, 2]);
    }

    #[test]
    fn even_split() {
        assert_eq!(allocate_usage(4, 4), vec![1, 1, 1, 1]);
    }

    #[test]
    fn single_carrier_takes_everything() {
        assert_eq!(allocate_usage(1, 17), vec![17]);
    }

    #[test]
    fn zero_target_is_all_zero() {
        assert_eq!(allocate_usage(5, 0), vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn exhausted_target_leaves_trailing_zeros() {
        // base = ceil(5/4) = 2 → 2, 2, 1, 0
        assert_eq!(allocate_usage(4, 5), vec![2, 2, 1, 0]);
        // base = ceil(2/5) = 1 → 1, 1, 0, 0, 0
        assert_eq!(allocate_usage(5, 2), vec![1, 1, 0, 0, 0]);
    }

    #[test]
    fn sum_and_clamp_hold_for_all_small_shapes() {
        for n in 1..=12usize {
            for target in 0..=60u32 {
                let counts = allocate_usage(n, target);
                let base = target.div_ceil(n as u32);
                assert_eq!(counts.len(), n);
                assert_eq!(counts.iter().sum::<u32>(), target, "n={n} target={target}");
                assert!(counts.iter().all(|&c| c <= base));
                assert!(counts.windows(2).all(|w| w[0] >= w[1]), "n={n} target={target}");
            }
        }
    }

    #[test]
    fn no_carriers_no_counts() {
        assert!(allocate_usage(0, 9).is_empty());
    }

    #[test]
    fn balance_sets_first_matching_operation_only() {
        let mut carriers = lane("source", 2, &["Move", "Echo Transfer", "Transfer Again"]);
        let counts = balance(&mut carriers, 3, |op| op.name.contains("Transfer"), "TimesUsed").unwrap();

        assert_eq!(counts, vec![2, 1]);
        assert_eq!(carriers[0].pending[1].param("TimesUsed"), Some(&ParamValue::Int(2)));
        assert_eq!(carriers[0].pending[2].param("TimesUsed"), None);
        assert_eq!(carriers[1].pending[1].param("TimesUsed"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn balance_match_is_case_sensitive() {
        let mut carriers = lane("source", 1, &["echo transfer"]);
        balance(&mut carriers, 4, |op| op.name.contains("Transfer"), "TimesUsed").unwrap();
        assert_eq!(times_used(&carriers[0]), None);
    }

    #[test]
    fn balance_skips_carriers_without_operation() {
        let mut carriers = vec![
            carrier("source", 1, &["Move"]),
            carrier("source", 2, &["Echo Transfer"]),
        ];
        let counts = balance(&mut carriers, 4, |op| op.name.contains("Transfer"), "TimesUsed").unwrap();
        assert_eq!(counts, vec![2, 2]);
        assert_eq!(times_used(&carriers[0]), None);
        assert_eq!(times_used(&carriers[1]), Some(2));
    }

    #[test]
    fn balance_empty_lane_is_an_error() {
        let mut carriers: Vec<Carrier> = Vec::new();
        let err = balance(&mut carriers, 3, |_| true, "TimesUsed").unwrap_err();
        assert!(matches!(err, AdjustError::NoCarriers));
        assert_eq!(err.to_string(), "no carriers to balance");
    }

    #[test]
    fn zero_target_neutralizes_parameter() {
        let mut carriers = lane("source", 2, &["Echo Transfer"]);
        carriers[0].pending[0].set_param("TimesUsed", 7u32);
        balance(&mut carriers, 0, |op| op.name.contains("Transfer"), "TimesUsed").unwrap();
        assert_eq!(times_used(&carriers[0]), Some(0));
        assert_eq!(times_used(&carriers[1]), Some(0));
        assert_eq!(carriers[0].pending.len(), 1);
    }

    #[test]
    fn balance_lane_targets_sibling_lane_size() {
        let mut carriers = lane("source", 3, &["Echo Transfer"]);
        carriers.extend(lane("dest", 10, &["Move"]));
        let mut plan = RunPlan::from_carriers(carriers).unwrap();

        let usage =
            balance_lane(&mut plan, &LaneId::new("source"), &BalancerConfig::default()).unwrap();

        assert_eq!(usage.target, 10);
        assert_eq!(usage.counts, vec![4, 4, 2]);
        assert_eq!(usage.unmatched, 0);
        let source = plan.carriers_in_lane(&LaneId::new("source")).unwrap();
        let written: Vec<Option<i64>> = source.iter().map(times_used).collect();
        assert_eq!(written, vec![Some(4), Some(4), Some(2)]);
    }

    #[test]
    fn balance_lane_requires_two_lanes() {
        let mut carriers = lane("a", 2, &["Echo Transfer"]);
        carriers.extend(lane("b", 2, &["Move"]));
        carriers.extend(lane("c", 2, &["Move"]));
        let mut plan = RunPlan::from_carriers(carriers).unwrap();
        let before = plan.clone();

        let err = balance_lane(&mut plan, &LaneId::new("a"), &BalancerConfig::default()).unwrap_err();

        match err {
            AdjustError::LaneCount { required, found, .. } => {
                assert_eq!(required, 2);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(plan, before);
    }

    #[test]
    fn balance_lane_single_lane_plan_is_rejected() {
        let mut plan = RunPlan::from_carriers(lane("a", 2, &["Echo Transfer"])).unwrap();
        let err = balance_lane(&mut plan, &LaneId::new("a"), &BalancerConfig::default()).unwrap_err();
        assert!(matches!(err, AdjustError::LaneCount { found: 1, .. }));
    }
}
