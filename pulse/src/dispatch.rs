//! Fan out one probe per endpoint
//!
//! Each probe runs in its own tokio task, measures its own round trip and sends exactly one
//! [Outcome] back to the event loop. Probes never touch shared state.

use std::{sync::Arc, time::Duration};

use log::debug;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle, time::Instant};

use crate::{
    error::ProbeError,
    probe::{Outcome, Probe},
    registry::{Endpoint, Registry},
};

/// Probe a single endpoint, bounded by `timeout`
pub async fn probe_one(
    probe: &dyn Probe,
    index: usize,
    endpoint: &Endpoint,
    timeout: Duration,
) -> Outcome {
    let start = Instant::now();

    let reply = tokio::time::timeout(timeout, probe.check(endpoint)).await;
    let elapsed = start.elapsed();

    match reply {
        Ok(Ok(code)) => Outcome::response(index, code, elapsed),
        Ok(Err(error)) => Outcome::failure(index, error, elapsed),
        Err(_) => Outcome::failure(index, ProbeError::Timeout(timeout), elapsed),
    }
}

/// Spawn one probe task per endpoint in the registry.
///
/// Outcomes go to `outcomes` without waiting for them to be handled. When the receiver is gone
/// (the loop has quit) the outcome is dropped.
pub fn dispatch_all(
    registry: Arc<Registry>,
    probe: Arc<dyn Probe>,
    timeout: Duration,
    outcomes: UnboundedSender<Outcome>,
) -> Vec<JoinHandle<()>> {
    (0..registry.len())
        .map(|index| {
            let registry = registry.clone();
            let probe = probe.clone();
            let outcomes = outcomes.clone();

            tokio::spawn(async move {
                let endpoint = &registry[index];
                debug!("Probing {} ({})", endpoint, index);

                let outcome = probe_one(probe.as_ref(), index, endpoint, timeout).await;

                if outcomes.send(outcome).is_err() {
                    debug!("Loop stopped, dropping outcome for {}", endpoint);
                }
            })
        })
        .collect()
}
