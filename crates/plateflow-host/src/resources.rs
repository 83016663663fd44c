//! Shared device resources.
//!
//! Devices outside a carrier's own steps (bulk dispensers, for instance)
//! must be claimed before use and released afterwards, or the host
//! scheduler treats them as busy.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use plateflow_core::Operation;

use crate::error::{DispatchError, DispatchResult};

/// Claim/execute/release access to named device resources.
pub trait ResourcePool {
    fn contains(&self, name: &str) -> bool;

    fn allocate(&mut self, name: &str) -> DispatchResult<()>;

    /// Run `operation` on an allocated resource.
    fn execute(&mut self, name: &str, operation: &Operation) -> DispatchResult<()>;

    fn release(&mut self, name: &str) -> DispatchResult<()>;
}

/// Something that happened to a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResourceAction {
    Allocated { resource: String },
    Executed { resource: String, operation: Operation },
    Released { resource: String },
}

/// In-memory pool that records every action instead of driving hardware.
#[derive(Debug, Default, Clone)]
pub struct RecordingPool {
    known: BTreeSet<String>,
    allocated: BTreeSet<String>,
    log: Vec<ResourceAction>,
}

impl RecordingPool {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn actions(&self) -> &[ResourceAction] {
        &self.log
    }

    pub fn is_allocated(&self, name: &str) -> bool {
        self.allocated.contains(name)
    }
}

impl ResourcePool for RecordingPool {
    fn contains(&self, name: &str) -> bool {
        self.known.contains(name)
    }

    fn allocate(&mut self, name: &str) -> DispatchResult<()> {
        if !self.known.contains(name) {
            return Err(DispatchError::UnknownResource(name.to_string()));
        }
        if !self.allocated.insert(name.to_string()) {
            return Err(DispatchError::AlreadyAllocated(name.to_string()));
        }
        debug!(resource = name, "resource allocated");
        self.log.push(ResourceAction::Allocated {
            resource: name.to_string(),
        });
        Ok(())
    }

    fn execute(&mut self, name: &str, operation: &Operation) -> DispatchResult<()> {
        if !self.allocated.contains(name) {
            return Err(DispatchError::NotAllocated(name.to_string()));
        }
        debug!(resource = name, operation = %operation.name, "resource operation executed");
        self.log.push(ResourceAction::Executed {
            resource: name.to_string(),
            operation: operation.clone(),
        });
        Ok(())
    }

    fn release(&mut self, name: &str) -> DispatchResult<()> {
        if !self.allocated.remove(name) {
            return Err(DispatchError::NotAllocated(name.to_string()));
        }
        debug!(resource = name, "resource released");
        self.log.push(ResourceAction::Released {
            resource: name.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_execute_release() {
        let mut pool = RecordingPool::new(["Combi 1"]);
        pool.allocate("Combi 1").unwrap();
        assert!(pool.is_allocated("Combi 1"));
        pool.execute("Combi 1", &Operation::new("Empty")).unwrap();
        pool.release("Combi 1").unwrap();

        assert!(!pool.is_allocated("Combi 1"));
        assert_eq!(pool.actions().len(), 3);
    }

    #[test]
    fn unknown_and_unallocated_resources_fail() {
        let mut pool = RecordingPool::new(["Combi 1"]);
        assert!(matches!(pool.allocate("Combi 9"), Err(DispatchError::UnknownResource(_))));
        assert!(matches!(
            pool.execute("Combi 1", &Operation::new("Empty")),
            Err(DispatchError::NotAllocated(_))
        ));
        assert!(matches!(pool.release("Combi 1"), Err(DispatchError::NotAllocated(_))));
    }

    #[test]
    fn double_allocation_fails() {
        let mut pool = RecordingPool::new(["Combi 1"]);
        pool.allocate("Combi 1").unwrap();
        assert!(matches!(pool.allocate("Combi 1"), Err(DispatchError::AlreadyAllocated(_))));
    }
}
