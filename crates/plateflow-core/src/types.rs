//! Shared types used across plateflow crates.
//!
//! A run plan is made of lanes; each lane holds carriers ordered by their
//! 1-based ordinal. A carrier started from a physical [`Slot`] and carries
//! the ordered list of [`Operation`]s it has not executed yet.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a lane within one plan instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(String);

impl LaneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies one carrier: its lane plus its ordinal within that lane.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CarrierKey {
    pub lane: LaneId,
    pub ordinal: u32,
}

impl CarrierKey {
    pub fn new(lane: impl Into<LaneId>, ordinal: u32) -> Self {
        Self {
            lane: lane.into(),
            ordinal,
        }
    }
}

impl fmt::Display for CarrierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.lane, self.ordinal)
    }
}

/// Physical storage location a carrier was picked from.
///
/// Two carriers with equal slots are the same physical item presented more
/// than once.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub resource: String,
    pub stack: u32,
    pub position: u32,
}

impl Slot {
    pub fn new(resource: impl Into<String>, stack: u32, position: u32) -> Self {
        Self {
            resource: resource.into(),
            stack,
            position,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}:{}]", self.resource, self.stack, self.position)
    }
}

/// Value of a single operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

/// Parameter name → value.
pub type Params = BTreeMap<String, ParamValue>;

/// A named step pending execution on a carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub executable: bool,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
            executable: false,
        }
    }

    /// Builder-style parameter setter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Case-insensitive substring match on the operation name.
    pub fn name_contains_ignore_case(&self, needle: &str) -> bool {
        self.name.to_uppercase().contains(&needle.to_uppercase())
    }
}

/// A unit of work moving through one lane of a run plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    /// 1-based position within the lane.
    pub ordinal: u32,
    pub lane: LaneId,
    pub slot: Slot,
    /// Labware type loaded on this carrier (e.g. "Labcyte_Polypropylene_384").
    #[serde(default)]
    pub labware: String,
    /// Steps not yet executed, in execution order.
    #[serde(default)]
    pub pending: Vec<Operation>,
}

impl Carrier {
    pub fn key(&self) -> CarrierKey {
        CarrierKey {
            lane: self.lane.clone(),
            ordinal: self.ordinal,
        }
    }

    /// First pending operation satisfying `pred`.
    pub fn find_pending_mut(
        &mut self,
        mut pred: impl FnMut(&Operation) -> bool,
    ) -> Option<&mut Operation> {
        self.pending.iter_mut().find(|op| pred(op))
    }

    /// Swap in a new pending sequence, returning the previous one.
    pub fn replace_pending(&mut self, pending: Vec<Operation>) -> Vec<Operation> {
        std::mem::replace(&mut self.pending, pending)
    }

    pub fn pending_names(&self) -> Vec<&str> {
        self.pending.iter().map(|op| op.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_value_untagged_json() {
        let op: Operation = serde_json::from_str(
            r#"{"name":"Echo LiquidTransfer","params":{"TimesUsed":3,"Script Name":"PP_384"}}"#,
        )
        .unwrap();
        assert_eq!(op.param("TimesUsed"), Some(&ParamValue::Int(3)));
        assert_eq!(
            op.param("Script Name").and_then(ParamValue::as_text),
            Some("PP_384")
        );
        assert!(!op.executable);
    }

    #[test]
    fn name_match_ignores_case() {
        let op = Operation::new("Plate Spin 1000g");
        assert!(op.name_contains_ignore_case("SPIN"));
        assert!(!op.name_contains_ignore_case("SEAL"));
    }

    #[test]
    fn replace_pending_returns_old_sequence() {
        let mut carrier = Carrier {
            ordinal: 1,
            lane: LaneId::new("source"),
            slot: Slot::new("Hotel 1", 1, 3),
            labware: String::new(),
            pending: vec![Operation::new("Seal"), Operation::new("Move")],
        };
        let old = carrier.replace_pending(vec![Operation::new("Move")]);
        assert_eq!(old.len(), 2);
        assert_eq!(carrier.pending_names(), vec!["Move"]);
    }

    #[test]
    fn displays() {
        assert_eq!(CarrierKey::new("dest", 4).to_string(), "dest#4");
        assert_eq!(Slot::new("Hotel 2", 1, 7).to_string(), "Hotel 2[1:7]");
    }
}
