//! Pulse probes a list of endpoints in parallel and keeps a live view of how each one is doing.
//!
//! ```text
//! Registry ──> dispatch_all (one task per endpoint) ──Outcome──┐
//!                                                              ├──> EventLoop ──> project ──> DisplaySink
//! tick timer / user commands ──────────────────────────────────┘
//! ```
//!
//! All progress state lives in the [EventLoop]. Probes and timers only send it events.

pub mod config;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod event_loop;
pub mod probe;
pub mod progress;
pub mod registry;
pub mod runtime;

pub use config::PulseConfig;
pub use display::{DisplaySink, Row, Tone, View, DEFAULT_PAGE_ROWS};
pub use error::{ProbeError, PulseError};
pub use event_loop::{Command, EventLoop};
pub use probe::{HttpProbe, Outcome, Probe};
pub use progress::{Progress, Status, Summary};
pub use registry::{Endpoint, Registry};

/// Name of the Crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Version of the Crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
