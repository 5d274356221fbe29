//! Terminal display sink
//!
//! Draws the progress table on the alternate screen. Layout is computed by [table_lines] so it
//! can be checked without a terminal.

use std::io::{self, Write};

use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::{cursor, style, terminal, ExecutableCommand, QueueableCommand};
use pulse::{DisplaySink, PulseError, Row, Tone, View, DEFAULT_PAGE_ROWS};

const STATUS_TITLE: &str = "Status";
const URL_TITLE: &str = "Url";
const ELAPSED_TITLE: &str = "Elapsed Time";
/// Widest status label, `FAIL (404)`
const STATUS_WIDTH: usize = 10;
const ELAPSED_WIDTH: usize = 12;
/// Lines used by borders, header, footer
const CHROME_HEIGHT: usize = 6;

/// Part of the table a line belongs to, decides its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Border,
    Header,
    Row(Tone),
    Selected(Tone),
    Footer,
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        format!("{:<width$}", text, width = width)
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn rule(left: char, mid: char, right: char, widths: [usize; 3]) -> String {
    let [status, url, elapsed] = widths.map(|width| "─".repeat(width + 2));
    format!("{left}{status}{mid}{url}{mid}{elapsed}{right}")
}

fn cells(status: &str, url: &str, elapsed: &str, widths: [usize; 3]) -> String {
    format!(
        "│ {} │ {} │ {} │",
        fit(status, widths[0]),
        fit(url, widths[1]),
        fit(elapsed, widths[2])
    )
}

/// Rows that fit in a terminal `height` lines tall
pub fn visible_rows(height: u16) -> usize {
    (height as usize).saturating_sub(CHROME_HEIGHT).max(1)
}

/// First row to show so that `selected` stays in view, moving as little as possible from `offset`
pub fn scroll_offset(selected: usize, offset: usize, visible: usize, len: usize) -> usize {
    let offset = if selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    };
    offset.min(len.saturating_sub(visible))
}

/// Lay out the bordered table for a terminal of `width` x `height`, starting at row `offset`
pub fn table_lines(
    rows: &[Row],
    view: &View,
    offset: usize,
    width: u16,
    height: u16,
) -> Vec<(String, LineKind)> {
    let longest = rows
        .iter()
        .map(|row| row.endpoint.chars().count())
        .max()
        .unwrap_or(0)
        .max(URL_TITLE.len());
    // 10 = borders and padding around three columns
    let room = (width as usize).saturating_sub(STATUS_WIDTH + ELAPSED_WIDTH + 10);
    let widths = [STATUS_WIDTH, longest.min(room.max(URL_TITLE.len())), ELAPSED_WIDTH];

    let visible = visible_rows(height);
    let offset = offset.min(rows.len().saturating_sub(visible));
    let window = rows.iter().enumerate().skip(offset).take(visible);
    let shown = window.len();

    let mut lines = vec![
        (rule('┌', '┬', '┐', widths), LineKind::Border),
        (
            cells(STATUS_TITLE, URL_TITLE, ELAPSED_TITLE, widths),
            LineKind::Header,
        ),
        (rule('├', '┼', '┤', widths), LineKind::Border),
    ];
    lines.extend(window.map(|(index, row)| {
        let kind = if view.focused && index == view.selected {
            LineKind::Selected(row.tone)
        } else {
            LineKind::Row(row.tone)
        };
        (cells(&row.status, &row.endpoint, &row.elapsed, widths), kind)
    }));
    lines.push((rule('└', '┴', '┘', widths), LineKind::Border));

    let mut footer = String::new();
    if shown < rows.len() {
        footer.push_str(&format!(
            "rows {}-{} of {}  ",
            offset + 1,
            offset + shown,
            rows.len()
        ));
    }
    footer.push_str(if view.focused {
        "q: quit  ↑/↓ pgup/pgdn: scroll  esc: blur table"
    } else {
        "q: quit  esc: focus table"
    });
    lines.push((footer, LineKind::Footer));

    lines
}

fn colour(kind: LineKind, view: &View) -> Color {
    match kind {
        LineKind::Border if view.focused => Color::Grey,
        LineKind::Border => Color::DarkGrey,
        LineKind::Header => Color::White,
        LineKind::Row(Tone::Waiting) | LineKind::Selected(Tone::Waiting) => Color::Yellow,
        LineKind::Row(Tone::Ok) | LineKind::Selected(Tone::Ok) => Color::Green,
        LineKind::Row(Tone::Fail) | LineKind::Selected(Tone::Fail) => Color::Red,
        LineKind::Footer => Color::DarkGrey,
    }
}

/// Write one frame over the previous one. Each line clears only what is left of it, so the
/// screen is never blanked between frames.
fn queue_frame<W: Write>(
    out: &mut W,
    lines: &[(String, LineKind)],
    view: &View,
) -> io::Result<()> {
    out.queue(cursor::MoveTo(0, 0))?;

    for (line, kind) in lines {
        match kind {
            LineKind::Header => {
                out.queue(SetAttribute(Attribute::Bold))?;
            }
            LineKind::Selected(_) => {
                out.queue(SetAttribute(Attribute::Reverse))?;
            }
            _ => {}
        }
        out.queue(SetForegroundColor(colour(*kind, view)))?;
        out.queue(style::Print(line))?;
        out.queue(ResetColor)?;
        out.queue(SetAttribute(Attribute::Reset))?;
        out.queue(terminal::Clear(terminal::ClearType::UntilNewLine))?;
        out.queue(cursor::MoveToNextLine(1))?;
    }

    // lines left over from a taller previous frame
    out.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
    out.flush()
}

fn restore(stdout: &mut io::Stdout) {
    let _ = stdout.execute(cursor::Show);
    let _ = stdout.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Owns the terminal for the lifetime of a run. Dropping it restores the terminal.
pub struct Tui {
    stdout: io::Stdout,
    /// First visible row, kept between frames so scrolling is stable
    offset: usize,
}

impl Tui {
    pub fn setup() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        stdout.execute(terminal::EnterAlternateScreen)?;
        stdout.execute(terminal::Clear(terminal::ClearType::All))?;
        stdout.execute(cursor::Hide)?;

        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore(&mut io::stdout());
            original_hook(panic_info);
        }));

        Ok(Self { stdout, offset: 0 })
    }

    fn draw(&mut self, rows: &[Row], view: &View) -> io::Result<()> {
        let (width, height) = terminal::size()?;
        self.offset = scroll_offset(view.selected, self.offset, visible_rows(height), rows.len());

        let lines = table_lines(rows, view, self.offset, width, height);
        queue_frame(&mut self.stdout, &lines, view)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        restore(&mut self.stdout);
    }
}

impl DisplaySink for Tui {
    fn render(&mut self, rows: &[Row], view: &View) -> Result<(), PulseError> {
        self.draw(rows, view).map_err(PulseError::Render)
    }

    fn page_rows(&self) -> usize {
        terminal::size()
            .map(|(_, height)| visible_rows(height))
            .unwrap_or(DEFAULT_PAGE_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, endpoint: &str, tone: Tone) -> Row {
        Row {
            status: status.to_string(),
            endpoint: endpoint.to_string(),
            elapsed: "00:01.250".to_string(),
            tone,
        }
    }

    fn hosts(count: usize) -> Vec<Row> {
        (0..count)
            .map(|index| row("…", &format!("https://host{}.test", index), Tone::Waiting))
            .collect()
    }

    fn focused(selected: usize) -> View {
        View {
            focused: true,
            selected,
        }
    }

    fn shown(lines: &[(String, LineKind)]) -> Vec<&str> {
        lines
            .iter()
            .filter(|(_, kind)| matches!(kind, LineKind::Row(_) | LineKind::Selected(_)))
            .map(|(line, _)| line.as_str())
            .collect()
    }

    #[test]
    fn table_has_borders_header_and_rows() {
        let rows = vec![
            row("…", "https://example.invalid", Tone::Waiting),
            row("OK (200)", "https://example.com", Tone::Ok),
        ];
        let lines = table_lines(&rows, &focused(0), 0, 120, 40);

        let kinds: Vec<LineKind> = lines.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Border,
                LineKind::Header,
                LineKind::Border,
                LineKind::Selected(Tone::Waiting),
                LineKind::Row(Tone::Ok),
                LineKind::Border,
                LineKind::Footer,
            ]
        );
        assert_eq!(
            lines[4].0,
            "│ OK (200)   │ https://example.com     │ 00:01.250    │"
        );
        assert!(lines[1].0.contains("Elapsed Time"));
        assert!(lines[6].0.ends_with("esc: blur table"));

        // every table line has the same width
        let width = lines[0].0.chars().count();
        assert!(lines[..6].iter().all(|(line, _)| line.chars().count() == width));
    }

    #[test]
    fn long_urls_are_cut_to_terminal_width() {
        let long = format!("https://example.com/{}", "a".repeat(200));
        let lines = table_lines(&[row("FAIL", &long, Tone::Fail)], &View::default(), 0, 80, 40);

        assert!(lines[3].0.chars().count() <= 80);
        assert!(lines[3].0.contains('…'));
        assert_eq!(lines[3].1, LineKind::Row(Tone::Fail));
        assert!(lines.last().unwrap().0.ends_with("esc: focus table"));
    }

    #[test]
    fn rows_beyond_height_are_counted() {
        let lines = table_lines(&hosts(20), &View::default(), 0, 100, 10);

        assert_eq!(shown(&lines).len(), 4);
        assert!(lines.last().unwrap().0.starts_with("rows 1-4 of 20"));
    }

    #[test]
    fn window_follows_the_selection() {
        assert_eq!(scroll_offset(0, 0, 4, 20), 0);
        assert_eq!(scroll_offset(3, 0, 4, 20), 0);
        assert_eq!(scroll_offset(4, 0, 4, 20), 1);
        assert_eq!(scroll_offset(15, 1, 4, 20), 12);
        // moving back up inside the window does not scroll
        assert_eq!(scroll_offset(13, 12, 4, 20), 12);
        assert_eq!(scroll_offset(5, 12, 4, 20), 5);
        // never past the last full page
        assert_eq!(scroll_offset(19, 30, 4, 20), 16);
        assert_eq!(scroll_offset(0, 3, 4, 2), 0);
    }

    #[test]
    fn scrolled_table_shows_the_selected_row() {
        let rows = hosts(20);
        let offset = scroll_offset(9, 0, visible_rows(10), rows.len());
        let lines = table_lines(&rows, &focused(9), offset, 100, 10);

        let visible = shown(&lines);
        assert_eq!(visible.len(), 4);
        assert!(visible[0].contains("https://host6.test"));
        assert!(visible[3].contains("https://host9.test"));
        let selected = lines
            .iter()
            .find(|(_, kind)| *kind == LineKind::Selected(Tone::Waiting))
            .unwrap();
        assert!(selected.0.contains("https://host9.test"));
        assert!(lines.last().unwrap().0.starts_with("rows 7-10 of 20"));
    }

    #[test]
    fn blurred_table_highlights_nothing() {
        let view = View {
            focused: false,
            selected: 1,
        };
        let lines = table_lines(&hosts(3), &view, 0, 100, 40);

        assert!(lines
            .iter()
            .all(|(_, kind)| !matches!(kind, LineKind::Selected(_))));
    }

    #[test]
    fn frames_overwrite_lines_without_blanking_the_screen() {
        let view = focused(0);
        let lines = table_lines(&hosts(2), &view, 0, 100, 40);
        let mut out = Vec::new();

        queue_frame(&mut out, &lines, &view).unwrap();

        let frame = String::from_utf8(out).unwrap();
        assert!(!frame.contains("\x1b[2J"));
        assert_eq!(frame.matches("\x1b[K").count(), lines.len());
        assert!(frame.ends_with("\x1b[J"));
        assert!(frame.contains("https://host1.test"));
    }
}
