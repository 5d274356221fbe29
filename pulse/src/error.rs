//! describe errors in Pulse

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

/// Error type for failures that stop a pulse run
#[derive(Error, Debug)]
pub enum PulseError {
    /// The endpoint list could not be read
    #[error("Failed to read endpoints from {path:?}")]
    Source {
        /// Location of the endpoint list
        path: PathBuf,
        /// Underlying io failure
        source: std::io::Error,
    },
    /// The display sink could not draw
    #[error("Render failed")]
    Render(#[source] std::io::Error),
    /// Configuration could not be extracted
    #[error("Configuration error")]
    Config(#[from] Box<figment::Error>),
    /// The http client could not be built
    #[error("Reqwest error")]
    Client(#[from] reqwest::Error),
    /// Error when starting the tokio runtime
    #[error("io::Error eg from tokio start")]
    Runtime(#[from] std::io::Error),
    /// A configuration value is out of range
    #[error("Invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

impl From<figment::Error> for PulseError {
    fn from(error: figment::Error) -> PulseError {
        PulseError::Config(Box::new(error))
    }
}

/// Transport level failure of a single probe. Never fatal to a run.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The endpoint is not a valid url
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The request failed before a response arrived
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// No response within the probe timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
