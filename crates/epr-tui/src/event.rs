//! Terminal event polling and key bindings

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use epr_core::carousel::Step;

use crate::app::{Message, View};

/// Poll for terminal events, producing a tick on timeout
pub fn poll(tick: Duration, view: View, editing_text: bool) -> Result<Option<Message>> {
    if !event::poll(tick)? {
        return Ok(Some(Message::Tick));
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(map_key(key, view, editing_text)),
        Event::Resize(width, _) => Ok(Some(Message::Resize(width))),
        _ => Ok(None),
    }
}

/// Translate a key press into a message for the current view
pub fn map_key(key: KeyEvent, view: View, editing_text: bool) -> Option<Message> {
    if editing_text {
        return match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(Message::EndTextEdit),
            KeyCode::Backspace => Some(Message::TextBackspace),
            KeyCode::Char(c) => Some(Message::TextInput(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => return Some(Message::Quit),
        KeyCode::Char('v') => return Some(Message::CycleVersion),
        KeyCode::Char('p') => return Some(Message::TogglePrerelease),
        KeyCode::Char('h') => return Some(Message::ShowHome),
        KeyCode::Char('b') => return Some(Message::ShowBrowse),
        _ => {}
    }

    match (view, key.code) {
        (View::Home, KeyCode::Tab) => Some(Message::NextLane),
        (View::Home, KeyCode::Left) => Some(Message::StepLane(Step::Prev)),
        (View::Home, KeyCode::Right) => Some(Message::StepLane(Step::Next)),
        (View::Home | View::Browse, KeyCode::Enter) => Some(Message::OpenSelected),

        (View::Browse, KeyCode::Char('/')) => Some(Message::BeginTextEdit),
        (View::Browse, KeyCode::Char('o')) => Some(Message::CycleOwner),
        (View::Browse, KeyCode::Char('t')) => Some(Message::CycleType),
        (View::Browse, KeyCode::Char('c')) => Some(Message::ToggleCategory),
        (View::Browse, KeyCode::Up) => Some(Message::MoveCategoryCursor(-1)),
        (View::Browse, KeyCode::Down) => Some(Message::MoveCategoryCursor(1)),
        (View::Browse, KeyCode::Left) => Some(Message::MoveCardCursor(-1)),
        (View::Browse, KeyCode::Right) => Some(Message::MoveCardCursor(1)),
        (View::Browse, KeyCode::PageUp) => Some(Message::PageUp),
        (View::Browse, KeyCode::PageDown) => Some(Message::PageDown),

        (View::Detail, KeyCode::Char('[')) => Some(Message::Gallery(Step::Prev)),
        (View::Detail, KeyCode::Char(']')) => Some(Message::Gallery(Step::Next)),
        (View::Detail, KeyCode::Up) => Some(Message::MovePanelCursor(-1)),
        (View::Detail, KeyCode::Down) => Some(Message::MovePanelCursor(1)),
        (View::Detail, KeyCode::Char('s')) => Some(Message::TogglePanel),
        (View::Detail, KeyCode::Esc | KeyCode::Backspace) => Some(Message::Back),

        _ => None,
    }
}
