//! Step removal for carriers that share a physical slot.
//!
//! Several logical carriers may be the same physical item presented again
//! (same starting slot). Preparatory steps (spin, pierce) only need to run
//! on the first visit and closing steps (seal) only on the last. Each such
//! step is followed by the transport step that serves it, so removal always
//! drops the step together with its successor.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use plateflow_core::{Carrier, CarrierKey, Operation, Slot};

/// Where a carrier falls among the carriers sharing its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotVisit {
    /// A sibling with a smaller ordinal exists.
    pub has_earlier: bool,
    /// A sibling with a larger ordinal exists.
    pub has_later: bool,
}

/// A removed step and the transport step paired with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedPair {
    pub step: String,
    pub paired: String,
}

/// Steps removed from one carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarrierEdit {
    pub carrier: CarrierKey,
    pub removed: Vec<RemovedPair>,
    /// Matching steps left in place because nothing follows them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unpaired: Vec<String>,
}

/// Result of [`strip_pairs`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stripped {
    pub kept: Vec<Operation>,
    pub removed: Vec<RemovedPair>,
    /// Names of matching operations kept for lack of a successor.
    pub unpaired: Vec<String>,
}

/// Classify every carrier by its position among its slot siblings.
///
/// The result is index-aligned with `carriers`.
pub fn slot_visits(carriers: &[Carrier]) -> Vec<SlotVisit> {
    let mut bounds: HashMap<&Slot, (u32, u32)> = HashMap::new();
    for carrier in carriers {
        bounds
            .entry(&carrier.slot)
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(carrier.ordinal);
                *hi = (*hi).max(carrier.ordinal);
            })
            .or_insert((carrier.ordinal, carrier.ordinal));
    }

    carriers
        .iter()
        .map(|carrier| {
            let (lo, hi) = bounds[&carrier.slot];
            SlotVisit {
                has_earlier: lo < carrier.ordinal,
                has_later: hi > carrier.ordinal,
            }
        })
        .collect()
}

/// Drop every operation whose name contains one of `names`
/// (case-insensitive) together with the operation right after it.
///
/// A matching operation with no successor is kept and listed in
/// [`Stripped::unpaired`].
pub fn strip_pairs(pending: Vec<Operation>, names: &[&str]) -> Stripped {
    let matches = |op: &Operation| names.iter().any(|n| op.name_contains_ignore_case(n));

    let mut out = Stripped {
        kept: Vec::with_capacity(pending.len()),
        ..Stripped::default()
    };
    let mut ops = pending.into_iter();
    while let Some(op) = ops.next() {
        if !matches(&op) {
            out.kept.push(op);
            continue;
        }
        match ops.next() {
            Some(paired) => out.removed.push(RemovedPair {
                step: op.name,
                paired: paired.name,
            }),
            None => {
                out.unpaired.push(op.name.clone());
                out.kept.push(op);
            }
        }
    }
    out
}

/// Remove redundant preparatory and closing steps across one lane.
///
/// Only the first visitor of a slot keeps `preparatory` steps and only the
/// last keeps `closing` steps. Returns one entry per carrier that lost a
/// pair or kept an unpaired matching step.
pub fn deduplicate(
    carriers: &mut [Carrier],
    preparatory: &[String],
    closing: &[String],
) -> Vec<CarrierEdit> {
    let visits = slot_visits(carriers);
    let mut edits = Vec::new();

    for (carrier, visit) in carriers.iter_mut().zip(visits) {
        let mut names: Vec<&str> = Vec::new();
        if visit.has_earlier {
            names.extend(preparatory.iter().map(String::as_str));
        }
        if visit.has_later {
            names.extend(closing.iter().map(String::as_str));
        }
        if names.is_empty() {
            continue;
        }

        let snapshot = std::mem::take(&mut carrier.pending);
        let Stripped {
            kept,
            removed,
            unpaired,
        } = strip_pairs(snapshot, &names);
        carrier.replace_pending(kept);

        if !unpaired.is_empty() {
            warn!(
                carrier = %carrier.key(),
                slot = %carrier.slot,
                steps = ?unpaired,
                "repeated slot step has no paired transport, kept"
            );
        }
        if !removed.is_empty() {
            debug!(
                carrier = %carrier.key(),
                slot = %carrier.slot,
                pairs = removed.len(),
                "removed repeated slot steps"
            );
        }
        if !removed.is_empty() || !unpaired.is_empty() {
            edits.push(CarrierEdit {
                carrier: carrier.key(),
                removed,
                unpaired,
            });
        }
    }

    if !edits.is_empty() {
        info!(carriers = edits.len(), "slot dedup applied");
    }
    edits
}
