//! Display projection
//!
//! [project] turns the current [Progress] into rows ready for a [DisplaySink]. It keeps no
//! state and can be called as often as needed.

use std::time::Duration;

use crate::{
    error::PulseError,
    progress::{Progress, Status},
    registry::Registry,
};

/// Placeholder shown in the status column until an endpoint has a result
pub const PLACEHOLDER: &str = "…";

/// Colouring hint for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Waiting,
    Ok,
    Fail,
}

/// One rendered line of the progress table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub status: String,
    pub endpoint: String,
    pub elapsed: String,
    pub tone: Tone,
}

/// Rows moved by a page step when the sink cannot tell how many fit
pub const DEFAULT_PAGE_ROWS: usize = 10;

/// View state owned by the event loop that the sink needs besides the rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct View {
    /// Table accepts row selection input
    pub focused: bool,
    /// Index of the selected row, always within the registry
    pub selected: usize,
}

/// Consumer of rendered rows, called after every state change that needs a redraw
pub trait DisplaySink {
    fn render(&mut self, rows: &[Row], view: &View) -> Result<(), PulseError>;

    /// Number of rows the sink shows at once, used as the page step
    fn page_rows(&self) -> usize {
        DEFAULT_PAGE_ROWS
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for &mut S {
    fn render(&mut self, rows: &[Row], view: &View) -> Result<(), PulseError> {
        (**self).render(rows, view)
    }

    fn page_rows(&self) -> usize {
        (**self).page_rows()
    }
}

/// Render a duration as `MM:SS.mmm`
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    format!(
        "{:02}:{:02}.{:03}",
        millis / 60_000,
        (millis / 1_000) % 60,
        millis % 1_000
    )
}

/// Map every endpoint to its row, in registry order
pub fn project(registry: &Registry, progress: &Progress) -> Vec<Row> {
    registry
        .iter()
        .map(|(index, endpoint)| {
            let record = progress.get(index);
            let status = record.map(|record| record.status());

            Row {
                status: status
                    .and_then(Status::label)
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                endpoint: endpoint.to_string(),
                elapsed: format_elapsed(record.map(|record| record.elapsed()).unwrap_or_default()),
                tone: match status {
                    Some(Status::Ok(_)) => Tone::Ok,
                    Some(Status::Fail(_)) => Tone::Fail,
                    _ => Tone::Waiting,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use crate::{error::ProbeError, probe::Outcome};

    use super::*;

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(Duration::ZERO), "00:00.000");
        assert_eq!(format_elapsed(Duration::from_millis(61_234)), "01:01.234");
        assert_eq!(format_elapsed(Duration::from_millis(999)), "00:00.999");
        assert_eq!(format_elapsed(Duration::from_micros(1_500)), "00:00.001");
        assert_eq!(format_elapsed(Duration::from_secs(100 * 60)), "100:00.000");
    }

    #[test]
    fn clock_before_start_renders_zero() {
        let registry = Registry::new(["https://example.com"]);
        let now = Instant::now();
        let mut progress = Progress::new(1);
        progress.start_all(now + Duration::from_secs(5));
        progress.tick(now);

        assert_eq!(project(&registry, &progress)[0].elapsed, "00:00.000");
    }

    #[test]
    fn unstarted_rows_show_placeholder() {
        let registry = Registry::new(["https://example.com"]);
        let rows = project(&registry, &Progress::new(1));

        assert_eq!(
            rows,
            vec![Row {
                status: PLACEHOLDER.to_string(),
                endpoint: "https://example.com".to_string(),
                elapsed: "00:00.000".to_string(),
                tone: Tone::Waiting,
            }]
        );
    }

    #[test]
    fn rows_follow_registry_order_not_completion_order() {
        let registry = Registry::new(["https://example.invalid", "https://example.com"]);
        let mut progress = Progress::new(2);
        progress.start_all(Instant::now());

        progress.complete(Outcome::response(1, 200, Duration::from_millis(120)));
        progress.complete(Outcome::failure(
            0,
            ProbeError::Timeout(Duration::from_secs(12)),
            Duration::from_millis(12_000),
        ));

        let rows = project(&registry, &progress);
        assert_eq!(rows[0].status, "FAIL");
        assert_eq!(rows[0].endpoint, "https://example.invalid");
        assert_eq!(rows[0].elapsed, "00:12.000");
        assert_eq!(rows[0].tone, Tone::Fail);
        assert_eq!(rows[1].status, "OK (200)");
        assert_eq!(rows[1].endpoint, "https://example.com");
        assert_eq!(rows[1].elapsed, "00:00.120");
        assert_eq!(rows[1].tone, Tone::Ok);
    }

    #[test]
    fn projection_has_no_side_effects() {
        let registry = Registry::new(["a", "b"]);
        let mut progress = Progress::new(2);
        progress.start_all(Instant::now());
        let before = progress.clone();

        let first = project(&registry, &progress);
        let second = project(&registry, &progress);

        assert_eq!(first, second);
        assert_eq!(before, progress);
    }
}
