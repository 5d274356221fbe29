use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::{error::ProbeError, registry::Endpoint};

/// This module contains the reqwest based probe
pub mod http;

pub use http::HttpProbe;

/// Result of probing one endpoint, sent from the dispatcher to the event loop
#[derive(Debug)]
pub struct Outcome {
    /// Registry index of the probed endpoint
    pub index: usize,
    /// Response status, 0 when no response was obtained
    pub code: u16,
    /// Transport failure, if any
    pub error: Option<ProbeError>,
    /// Measured round trip
    pub elapsed: Duration,
}

impl Outcome {
    pub fn response(index: usize, code: u16, elapsed: Duration) -> Self {
        Outcome {
            index,
            code,
            error: None,
            elapsed,
        }
    }

    pub fn failure(index: usize, error: ProbeError, elapsed: Duration) -> Self {
        Outcome {
            index,
            code: 0,
            error: Some(error),
            elapsed,
        }
    }
}

/// A single request against an endpoint.
///
/// Implementations only perform the I/O. Timing, the timeout bound and delivery of the
/// [Outcome] are the dispatcher's job so every probe honours the same contract.
#[async_trait]
pub trait Probe: Debug + Send + Sync {
    /// Issue one request and return the response status
    async fn check(&self, endpoint: &Endpoint) -> Result<u16, ProbeError>;
}
