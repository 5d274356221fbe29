//! The event loop owns all progress state.
//!
//! Probes, the tick timer and user commands only ever produce [Event] values. The loop applies
//! them one at a time so no record is ever read while another event is half way through
//! changing it, and no locks are needed.

use std::sync::Arc;

use log::{debug, info};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::{sleep, Instant},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::PulseConfig,
    dispatch::dispatch_all,
    display::{project, DisplaySink, Row, View},
    error::PulseError,
    probe::{Outcome, Probe},
    progress::Progress,
    registry::Registry,
};

/// User commands accepted by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stop processing and return
    Quit,
    /// Switch whether the table takes row selection input
    ToggleFocus,
    /// Row selection moves, only honoured while the table is focused
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

/// Everything the loop reacts to
#[derive(Debug)]
pub enum Event {
    Tick(Instant),
    Outcome(Outcome),
    Command(Command),
}

/// What the loop should do after applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Render,
    Idle,
    Quit,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Single consumer of every event in a run
///
/// ```mermaid
/// sequenceDiagram
///     participant Probe
///     participant Loop
///     participant Sink
///
///     Loop->>Loop: start_all
///     Loop-)Probe: dispatch_all (one task per endpoint)
///     loop until Quit or cancel
///         alt Outcome
///             Probe-)Loop: Outcome
///             Loop->>Sink: render
///         else Tick
///             Loop->>Loop: tick, reschedule
///             Loop->>Sink: render (only on change)
///         end
///     end
/// ```
#[derive(Debug)]
pub struct EventLoop<S> {
    registry: Arc<Registry>,
    progress: Progress,
    view: View,
    sink: S,
    config: PulseConfig,
}

impl<S: DisplaySink> EventLoop<S> {
    pub fn new(registry: Registry, sink: S, config: PulseConfig) -> Self {
        EventLoop {
            progress: Progress::new(registry.len()),
            registry: Arc::new(registry),
            view: View {
                focused: true,
                selected: 0,
            },
            sink,
            config,
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn rows(&self) -> Vec<Row> {
        project(&self.registry, &self.progress)
    }

    /// Mark every endpoint as started at `now`
    pub fn start_all(&mut self, now: Instant) {
        self.progress.start_all(now);
    }

    /// Apply a single event to the progress state
    pub fn apply(&mut self, event: Event) -> Flow {
        match event {
            Event::Tick(now) => {
                if self.progress.tick(now) {
                    Flow::Render
                } else {
                    Flow::Idle
                }
            }
            Event::Outcome(outcome) => {
                self.progress.complete(outcome);
                Flow::Render
            }
            Event::Command(Command::Quit) => Flow::Quit,
            Event::Command(Command::ToggleFocus) => {
                self.view.focused = !self.view.focused;
                Flow::Render
            }
            Event::Command(command) if !self.view.focused => {
                debug!("Ignoring {:?} while the table is blurred", command);
                Flow::Idle
            }
            Event::Command(command) => self.navigate(command),
        }
    }

    fn navigate(&mut self, command: Command) -> Flow {
        let page = self.sink.page_rows().max(1);
        let selected = self.view.selected;
        let target = match command {
            Command::Up => selected.saturating_sub(1),
            Command::Down => selected.saturating_add(1),
            Command::PageUp => selected.saturating_sub(page),
            Command::PageDown => selected.saturating_add(page),
            Command::Top => 0,
            Command::Bottom => usize::MAX,
            Command::Quit | Command::ToggleFocus => selected,
        }
        .min(self.registry.len().saturating_sub(1));

        if target == selected {
            Flow::Idle
        } else {
            self.view.selected = target;
            Flow::Render
        }
    }

    pub fn render(&mut self) -> Result<(), PulseError> {
        let rows = project(&self.registry, &self.progress);
        self.sink.render(&rows, &self.view)
    }

    /// Probe every endpoint and keep the display current until quit or cancel.
    ///
    /// Probes still running when the loop stops are left to finish on their own and their
    /// outcomes are dropped.
    pub async fn run(
        mut self,
        probe: Arc<dyn Probe>,
        mut commands: UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) -> Result<Progress, PulseError> {
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

        self.start_all(Instant::now());
        let probes = dispatch_all(
            self.registry.clone(),
            probe,
            self.config.timeout,
            outcome_tx,
        );
        info!("Dispatched {} probes", probes.len());
        self.render()?;

        let tick = sleep(self.config.tick);
        tokio::pin!(tick);

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Received cancellation");
                    break;
                },
                Some(command) = commands.recv() => Event::Command(command),
                Some(outcome) = outcome_rx.recv() => Event::Outcome(outcome),
                _ = &mut tick => Event::Tick(Instant::now()),
            };

            let ticked = matches!(event, Event::Tick(_));

            match self.apply(event) {
                Flow::Render => self.render()?,
                Flow::Idle => {}
                Flow::Quit => {
                    info!("Quit requested");
                    break;
                }
            }

            // next tick is only scheduled once this one has been fully handled
            if ticked {
                tick.as_mut().reset(Instant::now() + self.config.tick);
            }
        }

        debug!("Event loop stopped: {}", self.progress.summary());
        Ok(self.progress)
    }
}
