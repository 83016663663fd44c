//! Dispenser tubing flush after a lane's last carrier.

use tracing::debug;

use plateflow_core::{FlushConfig, Operation};

use crate::error::DispatchResult;
use crate::messaging::{Messenger, Notice, Severity};
use crate::resources::ResourcePool;

/// Empty every configured dispenser the pool knows about.
///
/// Each resource is allocated, emptied and released in turn; the release
/// happens even when the empty operation fails. Returns the flushed names.
pub fn flush_tubing<P, M>(
    pool: &mut P,
    messenger: &mut M,
    config: &FlushConfig,
) -> DispatchResult<Vec<String>>
where
    P: ResourcePool + ?Sized,
    M: Messenger + ?Sized,
{
    let mut flushed = Vec::new();
    for name in &config.resources {
        if !pool.contains(name) {
            debug!(resource = %name, "resource not present, skipping flush");
            continue;
        }

        pool.allocate(name)?;
        messenger.notify(Notice::new(
            Severity::Normal,
            "Tubing flush",
            format!("{} {name}.", config.operation),
        ));
        let operation =
            Operation::new(config.operation.as_str()).with_param(config.parameter.as_str(), config.volume);
        let result = pool.execute(name, &operation);
        pool.release(name)?;
        result?;

        flushed.push(name.clone());
    }
    Ok(flushed)
}
