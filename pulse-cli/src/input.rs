//! Keyboard commands
//!
//! `q` and `Ctrl-C` quit, `Esc` toggles table focus. Raw mode swallows SIGINT so `Ctrl-C` has to
//! be handled here as a key. Arrows, page keys and their vi style letters move the selection;
//! the event loop drops them while the table is blurred.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use log::warn;
use pulse::Command;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Command bound to a terminal event, if any
pub fn command_for(event: &Event) -> Option<Command> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match code {
        KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Esc => Some(Command::ToggleFocus),
        KeyCode::Up | KeyCode::Char('k') => Some(Command::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::Down),
        KeyCode::PageUp | KeyCode::Char('b') => Some(Command::PageUp),
        KeyCode::PageDown | KeyCode::Char('f') | KeyCode::Char(' ') => Some(Command::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(Command::Top),
        KeyCode::End | KeyCode::Char('G') => Some(Command::Bottom),
        _ => None,
    }
}

/// Forward key presses as commands until `cancel` fires or the loop stops listening
pub async fn forward_keys(commands: UnboundedSender<Command>, cancel: CancellationToken) {
    let mut events = EventStream::new();

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.next() => event,
        };

        match event {
            Some(Ok(event)) => {
                if let Some(command) = command_for(&event) {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
            }
            Some(Err(e)) => {
                warn!("Failed to read terminal input: {}", e);
                break;
            }
            None => break,
        }
    }
}
