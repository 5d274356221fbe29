//! Per endpoint progress of a run
//!
//! [Progress] holds one [ProgressRecord] per registry index. Records only change through
//! [Progress::start_all], [Progress::tick] and [Progress::complete] and once a record is
//! completed its status and elapsed time are frozen.

use std::{fmt, time::Duration};

use log::{debug, warn};
use tokio::time::Instant;

use crate::probe::Outcome;

/// Why an endpoint failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A response arrived with status 400 or above
    Http(u16),
    /// Status 0 with no transport error attached
    NoResponse,
    /// The request never produced a response
    Transport(String),
}

/// Status of a single endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Pending,
    InFlight,
    Ok(u16),
    Fail(Failure),
}

impl Status {
    /// Failure policy: any transport error, a missing status or a status of 400 and above fails
    pub fn classify(outcome: &Outcome) -> Status {
        match (&outcome.error, outcome.code) {
            (Some(error), _) => Status::Fail(Failure::Transport(error.to_string())),
            (None, 0) => Status::Fail(Failure::NoResponse),
            (None, code) if code >= 400 => Status::Fail(Failure::Http(code)),
            (None, code) => Status::Ok(code),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Ok(_) | Status::Fail(_))
    }

    /// Text for the status column, None while the endpoint has no result yet
    pub fn label(&self) -> Option<String> {
        match self {
            Status::Pending | Status::InFlight => None,
            Status::Ok(code) => Some(format!("OK ({})", code)),
            Status::Fail(Failure::Http(code)) => Some(format!("FAIL ({})", code)),
            Status::Fail(_) => Some("FAIL".to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::InFlight => write!(f, "in flight"),
            Status::Fail(Failure::Transport(reason)) => write!(f, "FAIL: {}", reason),
            terminal => write!(f, "{}", terminal.label().unwrap_or_default()),
        }
    }
}

/// Progress of one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressRecord {
    started_at: Option<Instant>,
    completed: bool,
    elapsed: Duration,
    status: Status,
}

impl ProgressRecord {
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn status(&self) -> &Status {
        &self.status
    }
}

/// Counts of a run at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub ok: usize,
    pub failed: usize,
    pub unfinished: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} failed, {} unfinished",
            self.ok, self.failed, self.unfinished
        )
    }
}

/// Progress of every endpoint in the registry, indexed by registry index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    records: Vec<ProgressRecord>,
}

impl Progress {
    /// All records start pending
    pub fn new(len: usize) -> Self {
        Progress {
            records: vec![ProgressRecord::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProgressRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[ProgressRecord] {
        &self.records
    }

    /// Stamp every unfinished record with `now` and mark it in flight
    pub fn start_all(&mut self, now: Instant) {
        for record in self.records.iter_mut().filter(|record| !record.completed) {
            record.started_at = Some(now);
            record.elapsed = Duration::ZERO;
            record.status = Status::InFlight;
        }
    }

    /// Refresh elapsed time of started, unfinished records.
    ///
    /// Returns true when at least one record changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for record in self.records.iter_mut().filter(|record| !record.completed) {
            if let Some(started_at) = record.started_at {
                let elapsed = now.saturating_duration_since(started_at);
                if elapsed > record.elapsed {
                    record.elapsed = elapsed;
                    changed = true;
                }
            }
        }

        changed
    }

    /// Apply the outcome of a probe. The first completion of a record wins and later ones are
    /// ignored. Returns true when the record was updated.
    pub fn complete(&mut self, outcome: Outcome) -> bool {
        let Some(record) = self.records.get_mut(outcome.index) else {
            warn!("Dropping outcome for unknown endpoint index {}", outcome.index);
            return false;
        };

        if record.completed {
            warn!(
                "Ignoring repeated completion for endpoint index {}",
                outcome.index
            );
            return false;
        }

        record.status = Status::classify(&outcome);
        record.elapsed = outcome.elapsed;
        record.completed = true;
        debug!(
            "Endpoint {} completed: {} in {:?}",
            outcome.index, record.status, record.elapsed
        );
        true
    }

    pub fn all_completed(&self) -> bool {
        self.records.iter().all(|record| record.completed)
    }

    pub fn summary(&self) -> Summary {
        self.records
            .iter()
            .fold(Summary::default(), |mut summary, record| {
                match record.status {
                    Status::Ok(_) => summary.ok += 1,
                    Status::Fail(_) => summary.failed += 1,
                    Status::Pending | Status::InFlight => summary.unfinished += 1,
                }
                summary
            })
    }
}
