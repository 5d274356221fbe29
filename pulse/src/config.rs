use std::time::Duration;

use figment::Figment;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::error::PulseError;

/// Default bound on a single probe
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);
/// Default period between elapsed time refreshes
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// HTTP method used by the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Head,
    Get,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Head => reqwest::Method::HEAD,
            Method::Get => reqwest::Method::GET,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Upper bound for each probe, in milliseconds
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Interval between elapsed time refreshes, in milliseconds
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub tick: Duration,
    pub method: Method,
    /// Let the client follow redirects and record the final status
    pub follow_redirects: bool,
    pub user_agent: String,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            tick: DEFAULT_TICK,
            method: Method::Head,
            follow_redirects: true,
            user_agent: format!("{}/{}", crate::NAME, crate::VERSION),
        }
    }
}

impl PulseConfig {
    /// Extract from layered sources and reject values the event loop cannot run with
    pub fn from_figment(figment: &Figment) -> Result<Self, PulseError> {
        let config: PulseConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// A zero tick would reschedule without ever sleeping and a zero timeout fails every probe
    pub fn validate(&self) -> Result<(), PulseError> {
        if self.timeout.is_zero() {
            return Err(PulseError::InvalidConfig {
                field: "timeout",
                reason: "must be greater than zero",
            });
        }
        if self.tick.is_zero() {
            return Err(PulseError::InvalidConfig {
                field: "tick",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}
